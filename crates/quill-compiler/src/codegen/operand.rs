//! Operands of the register-machine instruction set.

use std::fmt;

use crate::types::TypeId;

/// A value an instruction reads or writes.
///
/// `LoadIndexed` and `LoadField` are symbolic: they name a memory cell
/// without loading it. Used as a destination they become a direct store;
/// used as a value the builder first moves them into a temp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Constant(i64),
    /// A parameter or local variable's register.
    Local { reg: u32, name: String },
    /// A temporary; the number is its virtual stack slot.
    Temp(u32),
    /// Where the caller finds the return value.
    Return,
    /// `array[index]`
    LoadIndexed {
        array: Box<Operand>,
        index: Box<Operand>,
    },
    /// `object.field`; `index` is the field's position in the struct.
    LoadField {
        object: Box<Operand>,
        field: String,
        index: usize,
    },
    /// A freshly allocated instance of `ty`.
    New { ty: TypeId, name: String },
    /// A function in this module, used as a call target.
    Function { ty: TypeId, name: String },
}

impl Operand {
    pub fn is_temp(&self) -> bool {
        matches!(self, Operand::Temp(_))
    }

    pub fn as_constant(&self) -> Option<i64> {
        match self {
            Operand::Constant(value) => Some(*value),
            _ => None,
        }
    }

    /// Highest temp this operand reads, including temps nested inside a
    /// symbolic cell.
    pub fn highest_temp(&self) -> Option<u32> {
        match self {
            Operand::Temp(n) => Some(*n),
            Operand::LoadIndexed { array, index } => array.highest_temp().max(index.highest_temp()),
            Operand::LoadField { object, .. } => object.highest_temp(),
            _ => None,
        }
    }

    /// Whether this names a memory cell rather than a value.
    pub fn is_indexed(&self) -> bool {
        matches!(self, Operand::LoadIndexed { .. } | Operand::LoadField { .. })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(value) => write!(f, "{value}"),
            Operand::Local { name, .. } => f.write_str(name),
            Operand::Temp(n) => write!(f, "%t{n}"),
            Operand::Return => f.write_str("%ret"),
            Operand::LoadIndexed { array, index } => write!(f, "{array}[{index}]"),
            Operand::LoadField { object, field, .. } => write!(f, "{object}.{field}"),
            Operand::New { name, .. } => write!(f, "New({name})"),
            Operand::Function { name, .. } => f.write_str(name),
        }
    }
}
