//! quill parser crate.
//!
//! This crate provides the lexer and parser for quill source code:
//! - Lexical analysis (tokenization)
//! - Abstract Syntax Tree (AST) definitions
//! - A recursive-descent parser with Pratt expression parsing
//!
//! # Example
//!
//! ```
//! use quill_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let program = Parser::parse("func add(a: Int, b: Int) -> Int { return a + b }", &arena)
//!     .unwrap();
//! assert_eq!(program.functions().count(), 1);
//! ```

pub mod lexer;

pub mod ast;

pub use ast::Parser;
pub use lexer::{Lexer, Token, TokenKind};
pub use quill_core::Span;
