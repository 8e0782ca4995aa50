//! quill
//!
//! A front and mid end for a small language of structs, arrays and integer
//! functions: lexing, parsing, two-pass semantic analysis and lowering to a
//! register-machine control-flow graph.
//!
//! ```
//! let module = quill::compile_source("func one() -> Int { return 1 + 0 }").unwrap();
//! assert_eq!(module.render(), "L0:\n\t%ret = 1\n\tgoto  L1\nL1:\n");
//! ```
//!
//! ## Crates
//!
//! - [`quill_core`]: spans, type hashes and the error hierarchy
//! - [`quill_parser`]: lexer and arena-allocated AST
//! - [`quill_compiler`]: semantic passes and code generation

use bumpalo::Bump;
use tracing::debug;

pub use quill_compiler::codegen::{
    BasicBlock, BlockFlags, BlockId, CfgViolation, FunctionCode, Instruction, Operand,
};
pub use quill_compiler::{
    CheckedModel, CompiledModule, Compiler, CompilerOptions, DeclarationPass, TypeCheckPass,
    TypeDictionary, TypeId,
};
pub use quill_core::{
    CompilationError, DeclKind, ErrorCategory, LexError, ParseError, ParseErrorKind, QuillError,
    Span,
};
pub use quill_parser::Parser;
pub use quill_parser::ast::Program;

/// Compile `source` with the default [`CompilerOptions`].
pub fn compile_source(source: &str) -> Result<CompiledModule, QuillError> {
    compile_source_with(source, CompilerOptions::default())
}

/// Compile `source` from text to code.
pub fn compile_source_with(
    source: &str,
    options: CompilerOptions,
) -> Result<CompiledModule, QuillError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("compile_source");

    let arena = Bump::new();
    let program = Parser::parse(source, &arena)?;
    debug!(
        items = program.items().len(),
        nodes = program.node_count(),
        "parsed program"
    );
    let module = Compiler::compile(&program, options)?;
    Ok(module)
}
