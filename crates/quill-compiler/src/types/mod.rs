//! The type model.
//!
//! quill has one primitive (`Int`, which also carries booleans), structs,
//! arrays and a nullable wrapper reserved for the two reference kinds.
//! Every distinct type exists once in the [`TypeDictionary`] and is
//! referred to by a [`TypeId`] handle, so type equality is id equality.

mod dictionary;

pub use dictionary::TypeDictionary;

use crate::symbols::SymbolId;
use std::fmt;

/// Handle to a canonical type in a [`TypeDictionary`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    /// `$Void`: the result of a function that returns nothing.
    pub const VOID: TypeId = TypeId(0);
    /// `$Any`: placeholder for a variable whose type is inferred later.
    pub const ANY: TypeId = TypeId(1);
    /// `$Null`: the type of the null value.
    pub const NULL: TypeId = TypeId(2);
    /// `Int`
    pub const INT: TypeId = TypeId(3);

    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        TypeId(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// A canonical type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Void,
    Any,
    Null,
    Int,
    /// `T?`, where `T` is a struct or an array.
    Nullable(TypeId),
    /// `[T]`; the element is `Int`, a struct or a nullable struct.
    Array(TypeId),
    Struct(StructType),
    Function(FunctionType),
}

impl Type {
    /// Whether values of this type are references (and so may be nullable).
    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Struct(_) | Type::Array(_))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Int)
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            Type::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(f) => Some(f),
            _ => None,
        }
    }
}

/// A named struct with ordered fields.
///
/// A struct starts out *pending*: it may be referenced (and even used as a
/// field type of itself) before its declaration has been seen. Fields can
/// only be added while pending; [`StructType::complete`] seals it.
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub name: String,
    fields: Vec<Field>,
    pending: bool,
}

/// A struct field. Its position in the struct is its field index.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
}

impl StructType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            pending: true,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The field called `name`.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declaration-order index of the field called `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub(crate) fn push_field(&mut self, name: String, ty: TypeId) {
        self.fields.push(Field { name, ty });
    }

    pub(crate) fn complete(&mut self) {
        self.pending = false;
    }
}

/// A function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub name: String,
    params: Vec<Param>,
    /// `None` until the declaration pass has resolved it.
    return_type: Option<TypeId>,
}

/// A function parameter: its name, declared type and the symbol it binds.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeId,
    pub symbol: SymbolId,
}

impl FunctionType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: None,
        }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// The return type; `Void` when none was declared.
    pub fn return_type(&self) -> TypeId {
        self.return_type.unwrap_or(TypeId::VOID)
    }

    pub(crate) fn push_param(&mut self, param: Param) {
        self.params.push(param);
    }

    pub(crate) fn set_return_type(&mut self, ty: TypeId) {
        self.return_type = Some(ty);
    }
}
