//! Statement AST nodes for quill.

use crate::ast::decl::VarDecl;
use crate::ast::expr::Expr;
use crate::ast::{Ident, NodeId};
use quill_core::Span;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// `{ ... }`
    Block(&'ast Block<'ast>),
    /// `var x = expr`
    Var(&'ast VarStmt<'ast>),
    /// `var x: T`
    VarDecl(&'ast VarDecl<'ast>),
    If(&'ast IfStmt<'ast>),
    While(&'ast WhileStmt<'ast>),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Return(ReturnStmt<'ast>),
    /// `target = value`
    Assign(&'ast AssignStmt<'ast>),
    /// An expression evaluated for its effect.
    Expr(ExprStmt<'ast>),
}

impl<'ast> Stmt<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Block(s) => s.span,
            Self::Var(s) => s.span,
            Self::VarDecl(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::Break(s) => s.span,
            Self::Continue(s) => s.span,
            Self::Return(s) => s.span,
            Self::Assign(s) => s.span,
            Self::Expr(s) => s.span,
        }
    }
}

/// A braced statement list; opens a new lexical scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub id: NodeId,
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// `var name = init`; the variable's type is inferred from `init`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarStmt<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub init: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_branch: &'ast Stmt<'ast>,
    pub else_branch: Option<&'ast Stmt<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakStmt {
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinueStmt {
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignStmt<'ast> {
    pub target: &'ast Expr<'ast>,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}
