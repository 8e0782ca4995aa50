//! Top-level declarations: structs and functions.

use crate::ast::stmt::Block;
use crate::ast::types::TypeExpr;
use crate::ast::{Ident, NodeId};
use quill_core::Span;

/// A top-level item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'ast> {
    Struct(&'ast StructDecl<'ast>),
    Func(&'ast FuncDecl<'ast>),
}

impl<'ast> Item<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Item::Struct(s) => s.span,
            Item::Func(f) => f.span,
        }
    }

    pub fn name(&self) -> Ident<'ast> {
        match self {
            Item::Struct(s) => s.name,
            Item::Func(f) => f.name,
        }
    }
}

/// `struct Name { var f: T ... }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub fields: &'ast [VarDecl<'ast>],
    pub span: Span,
}

/// `func name(params) -> T { body }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuncDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub params: &'ast [VarDecl<'ast>],
    /// `None` means the function returns nothing.
    pub return_type: Option<&'ast TypeExpr<'ast>>,
    pub body: &'ast Block<'ast>,
    pub span: Span,
}

/// `name: T` as a struct field, function parameter or typed local.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub ty: &'ast TypeExpr<'ast>,
    pub span: Span,
}
