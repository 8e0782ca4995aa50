//! Register-machine instructions.

use std::fmt;

use quill_parser::ast::{BinaryOp, UnaryOp};

use super::Operand;

/// Identifier of a basic block within one function. The entry block is
/// always `L0` and the exit block `L1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    pub const ENTRY: BlockId = BlockId(0);
    pub const EXIT: BlockId = BlockId(1);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `to = from`
    Move { from: Operand, to: Operand },
    /// `result = op operand`
    Unary {
        op: UnaryOp,
        result: Operand,
        operand: Operand,
    },
    /// `result = left op right`
    Binary {
        op: BinaryOp,
        result: Operand,
        left: Operand,
        right: Operand,
    },
    Call { callee: Operand, args: Vec<Operand> },
    /// Append `value` to the end of `array`.
    Append { array: Operand, value: Operand },
    /// Continue at `if_true` when `condition` is non-zero, else at `if_false`.
    Branch {
        condition: Operand,
        if_true: BlockId,
        if_false: BlockId,
    },
    Jump { target: BlockId },
}

impl Instruction {
    /// Whether this instruction transfers control and so ends its block.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instruction::Branch { .. } | Instruction::Jump { .. })
    }

    /// Blocks control may continue at, true target first.
    pub fn targets(&self) -> Vec<BlockId> {
        match self {
            Instruction::Branch {
                if_true, if_false, ..
            } => vec![*if_true, *if_false],
            Instruction::Jump { target } => vec![*target],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Move { from, to } => write!(f, "{to} = {from}"),
            Instruction::Unary {
                op,
                result,
                operand,
            } => write!(f, "{result} = {op}{operand}"),
            Instruction::Binary {
                op,
                result,
                left,
                right,
            } => write!(f, "{result} = {left}{op}{right}"),
            Instruction::Call { callee, args } => {
                write!(f, "call {callee}")?;
                if !args.is_empty() {
                    f.write_str(" params ")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                }
                Ok(())
            }
            Instruction::Append { array, value } => write!(f, "{array}.append({value})"),
            Instruction::Branch {
                condition,
                if_true,
                if_false,
            } => write!(f, "if {condition} goto {if_true} else goto {if_false}"),
            // Two spaces: matches the established listing format.
            Instruction::Jump { target } => write!(f, "goto  {target}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        let call = Instruction::Call {
            callee: Operand::Temp(0),
            args: vec![Operand::Temp(1), Operand::Temp(2)],
        };
        assert_eq!(call.to_string(), "call %t0 params %t1, %t2");

        let bare = Instruction::Call {
            callee: Operand::Temp(0),
            args: Vec::new(),
        };
        assert_eq!(bare.to_string(), "call %t0");

        let branch = Instruction::Branch {
            condition: Operand::Temp(0),
            if_true: BlockId(2),
            if_false: BlockId(3),
        };
        assert_eq!(branch.to_string(), "if %t0 goto L2 else goto L3");
        assert_eq!(
            Instruction::Jump {
                target: BlockId::EXIT
            }
            .to_string(),
            "goto  L1"
        );

        let binary = Instruction::Binary {
            op: BinaryOp::Add,
            result: Operand::Temp(0),
            left: Operand::Temp(0),
            right: Operand::Constant(1),
        };
        assert_eq!(binary.to_string(), "%t0 = %t0+1");
    }

    #[test]
    fn only_control_transfers_terminate() {
        let jump = Instruction::Jump {
            target: BlockId(4),
        };
        let mov = Instruction::Move {
            from: Operand::Constant(1),
            to: Operand::Return,
        };
        assert!(jump.is_terminator());
        assert!(!mov.is_terminator());
        assert_eq!(jump.targets(), vec![BlockId(4)]);
        assert!(mov.targets().is_empty());
    }
}
