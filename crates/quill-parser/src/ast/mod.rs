//! Abstract Syntax Tree (AST) for quill.
//!
//! This module provides:
//! - AST node definitions for every quill construct
//! - The parser that builds them from tokens
//!
//! # Example
//!
//! ```
//! use quill_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     struct Tree { var left: Tree?; var right: Tree? }
//!
//!     func depth(t: Tree?) -> Int {
//!         return 0;
//!     }
//! "#;
//!
//! match Parser::parse(source, &arena) {
//!     Ok(program) => println!("parsed {} items", program.items().len()),
//!     Err(err) => eprintln!("parse error: {err}"),
//! }
//! ```

pub mod node;
pub mod ops;

mod parser;
mod type_parser;
pub mod types;

pub mod expr;
mod expr_parser;

pub mod stmt;
mod stmt_parser;

pub mod decl;

pub use quill_core::{ParseError, ParseErrorKind};

pub use decl::*;
pub use expr::*;
pub use node::*;
pub use ops::*;
pub use parser::Parser;
pub use stmt::*;
pub use types::*;

use quill_core::Span;

/// A parsed quill program.
///
/// Borrows from the arena it was parsed into. Node ids handed out while
/// parsing are dense in `0..node_count()`.
#[derive(Debug)]
pub struct Program<'ast> {
    items: &'ast [Item<'ast>],
    node_count: u32,
    span: Span,
}

impl<'ast> Program<'ast> {
    pub(crate) fn new(items: &'ast [Item<'ast>], node_count: u32, span: Span) -> Self {
        Self {
            items,
            node_count,
            span,
        }
    }

    /// Top-level declarations in source order.
    pub fn items(&self) -> &'ast [Item<'ast>] {
        self.items
    }

    /// Number of node ids handed out while parsing.
    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Function declarations in source order.
    pub fn functions(&self) -> impl Iterator<Item = &'ast FuncDecl<'ast>> + 'ast {
        self.items.iter().filter_map(|item| match item {
            Item::Func(f) => Some(*f),
            Item::Struct(_) => None,
        })
    }

    /// Struct declarations in source order.
    pub fn structs(&self) -> impl Iterator<Item = &'ast StructDecl<'ast>> + 'ast {
        self.items.iter().filter_map(|item| match item {
            Item::Struct(s) => Some(*s),
            Item::Func(_) => None,
        })
    }
}
