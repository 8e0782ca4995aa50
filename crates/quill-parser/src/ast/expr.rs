//! Expression AST nodes for quill.
//!
//! # Expression Precedence
//!
//! The parser uses Pratt parsing with the following precedence levels:
//! 1. Logical OR (`||`)
//! 2. Logical AND (`&&`)
//! 3. Equality and relational (`==`, `!=`, `<`, `<=`, `>`, `>=`)
//! 4. Additive (`+`, `-`)
//! 5. Multiplicative (`*`, `/`, `%`)
//! 6. Prefix unary (`-`, `!`)
//! 7. Postfix (call, index, field access)
//!
//! Every expression carries a [`NodeId`]; the type checker records the
//! computed type of each expression against that id.

use crate::ast::types::TypeExpr;
use crate::ast::{BinaryOp, Ident, NodeId, UnaryOp};
use quill_core::Span;

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Integer literal
    Literal(LiteralExpr),
    /// Name reference
    Name(NameExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Function call
    Call(&'ast CallExpr<'ast>),
    /// Array indexing
    Index(&'ast IndexExpr<'ast>),
    /// Field access (.)
    Field(&'ast FieldExpr<'ast>),
    /// `new T { ... }`
    New(&'ast NewExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the node id of this expression.
    pub fn id(&self) -> NodeId {
        match self {
            Self::Literal(e) => e.id,
            Self::Name(e) => e.id,
            Self::Binary(e) => e.id,
            Self::Unary(e) => e.id,
            Self::Call(e) => e.id,
            Self::Index(e) => e.id,
            Self::Field(e) => e.id,
            Self::New(e) => e.id,
        }
    }

    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Name(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Call(e) => e.span,
            Self::Index(e) => e.span,
            Self::Field(e) => e.span,
            Self::New(e) => e.span,
        }
    }
}

/// An integer literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr {
    pub id: NodeId,
    pub value: i64,
    pub span: Span,
}

/// A reference to a variable, parameter or function by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameExpr<'ast> {
    pub id: NodeId,
    pub ident: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub id: NodeId,
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub id: NodeId,
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

/// `callee(args...)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub id: NodeId,
    pub callee: &'ast Expr<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

/// `array[index]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub id: NodeId,
    pub array: &'ast Expr<'ast>,
    pub index: &'ast Expr<'ast>,
    pub span: Span,
}

/// `object.field`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldExpr<'ast> {
    pub id: NodeId,
    pub object: &'ast Expr<'ast>,
    pub field: Ident<'ast>,
    pub span: Span,
}

/// `new T` or `new T { inits }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    pub id: NodeId,
    pub ty: &'ast TypeExpr<'ast>,
    pub inits: &'ast [NewInit<'ast>],
    pub span: Span,
}

/// One entry of a `new` initializer list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NewInit<'ast> {
    /// `name = value`, for structs.
    Field(FieldInit<'ast>),
    /// A bare value, appended to an array.
    Element(&'ast Expr<'ast>),
}

/// `name = value` inside `new Struct { ... }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldInit<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

impl<'ast> NewInit<'ast> {
    pub fn span(&self) -> Span {
        match self {
            NewInit::Field(init) => init.span,
            NewInit::Element(expr) => expr.span(),
        }
    }
}
