//! Declared entities: types, functions and variables.
//!
//! Symbols live in a [`SymbolTable`] arena and are referred to by
//! [`SymbolId`]. Scopes map names to symbol ids; the AST maps declaration
//! and name nodes to symbol ids through the side tables in
//! [`Decorations`](crate::model::Decorations).

use std::fmt;

use quill_core::Span;
use quill_parser::ast::NodeId;

use crate::codegen::FunctionCode;
use crate::scope::ScopeId;
use crate::types::TypeId;

/// Handle to a symbol in a [`SymbolTable`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        SymbolId(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// A named entity.
#[derive(Debug, Clone)]
pub enum Symbol {
    /// A type name (`Int` or a struct).
    Type(TypeSymbol),
    Function(FunctionSymbol),
    /// A struct field, function parameter or local variable.
    Var(VarSymbol),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Type(s) => &s.name,
            Symbol::Function(s) => &s.name,
            Symbol::Var(s) => &s.name,
        }
    }

    /// The type of the entity; for a type symbol, the type it names.
    pub fn ty(&self) -> TypeId {
        match self {
            Symbol::Type(s) => s.ty,
            Symbol::Function(s) => s.ty,
            Symbol::Var(s) => s.ty,
        }
    }

    pub fn as_var(&self) -> Option<&VarSymbol> {
        match self {
            Symbol::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionSymbol> {
        match self {
            Symbol::Function(f) => Some(f),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeSymbol {
    pub name: String,
    pub ty: TypeId,
}

#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub name: String,
    pub ty: TypeId,
    /// The declaring `FuncDecl` node.
    pub decl: NodeId,
    /// The scope holding the parameters.
    pub scope: ScopeId,
    /// Generated code, attached by the driver once the function is compiled.
    pub code: Option<FunctionCode>,
}

/// What a [`VarSymbol`] was declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Field,
    Param,
    Local,
}

#[derive(Debug, Clone)]
pub struct VarSymbol {
    pub name: String,
    pub kind: VarKind,
    /// `$Any` for `var x = e` until the type checker merges in the
    /// initializer's type.
    pub ty: TypeId,
    pub span: Span,
}

/// Arena of every symbol declared in a program.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::new(self.symbols.len());
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn var(&self, id: SymbolId) -> Option<&VarSymbol> {
        self.get(id).as_var()
    }

    pub fn function(&self, id: SymbolId) -> Option<&FunctionSymbol> {
        self.get(id).as_function()
    }

    /// Give the variable `id` its final type.
    pub fn set_var_type(&mut self, id: SymbolId, ty: TypeId) {
        if let Symbol::Var(v) = &mut self.symbols[id.index()] {
            v.ty = ty;
        }
    }

    /// Store the generated code of function `id`.
    pub fn attach_code(&mut self, id: SymbolId, code: FunctionCode) {
        if let Symbol::Function(f) = &mut self.symbols[id.index()] {
            f.code = Some(code);
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId::new(i), s))
    }
}
