//! Core types shared by every quill crate.
//!
//! - [`Span`]: source locations carried from tokens through every error
//! - [`TypeHash`]: deterministic structural identity for canonical types
//! - [`error`]: the per-phase error hierarchy

pub mod error;
mod span;
mod type_hash;

pub use error::{
    CompilationError, DeclKind, ErrorCategory, LexError, ParseError, ParseErrorKind, QuillError,
};
pub use span::Span;
pub use type_hash::{TypeHash, hash_constants};
