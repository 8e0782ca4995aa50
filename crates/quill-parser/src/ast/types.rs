//! Type expressions as written in source.
//!
//! ```text
//! Int        Tree?        [Int]        [Tree?]?
//! ```

use crate::ast::{Ident, NodeId};
use quill_core::Span;

/// A syntactic type: a named type or an array, optionally nullable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeExpr<'ast> {
    pub id: NodeId,
    pub kind: TypeExprKind<'ast>,
    /// Trailing `?`.
    pub nullable: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExprKind<'ast> {
    /// `Name`
    Named(Ident<'ast>),
    /// `[element]`
    Array(&'ast TypeExpr<'ast>),
}

impl<'ast> TypeExpr<'ast> {
    /// Whether this is `[...]`.
    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeExprKind::Array(_))
    }
}
