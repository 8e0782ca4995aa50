//! Operator definitions for quill expressions.
//!
//! Provides enums for binary and unary operators along with the binding
//! powers used by the Pratt parser.

use crate::lexer::TokenKind;
use std::fmt;

/// Binary operators, lowest precedence first.
///
/// Booleans are integers, so the logical operators take and yield `Int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `||`
    LogicalOr,
    /// `&&`
    LogicalAnd,

    // Relational and equality share one precedence level.
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,

    /// `+`
    Add,
    /// `-`
    Sub,

    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    /// Left and right binding power. All binary operators are left-associative.
    pub fn binding_power(&self) -> (u8, u8) {
        use BinaryOp::*;
        match self {
            LogicalOr => (1, 2),
            LogicalAnd => (3, 4),
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => (5, 6),
            Add | Sub => (7, 8),
            Mul | Div | Mod => (9, 10),
        }
    }

    /// Try to convert a token kind to a binary operator.
    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match token {
            PipePipe => BinaryOp::LogicalOr,
            AmpAmp => BinaryOp::LogicalAnd,
            EqualEqual => BinaryOp::Equal,
            BangEqual => BinaryOp::NotEqual,
            TokenKind::Less => BinaryOp::Less,
            TokenKind::LessEqual => BinaryOp::LessEqual,
            TokenKind::Greater => BinaryOp::Greater,
            TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => BinaryOp::Div,
            Percent => BinaryOp::Mod,
            _ => return None,
        })
    }

    /// Source spelling, also used when rendering instructions.
    pub fn as_str(&self) -> &'static str {
        use BinaryOp::*;
        match self {
            LogicalOr => "||",
            LogicalAnd => "&&",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    LogicalNot,
}

impl UnaryOp {
    /// Higher than every binary operator.
    pub fn binding_power() -> u8 {
        11
    }

    pub fn from_token(token: TokenKind) -> Option<Self> {
        Some(match token {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::LogicalNot,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::LogicalNot => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binding power of postfix `[i]`, `.f` and `(args)`.
pub const POSTFIX_BINDING_POWER: u8 = 13;
