//! quill compiler
//!
//! Semantic analysis and register-machine code generation for quill
//! programs.
//!
//! ## Architecture
//!
//! - **Pass 1 (Declaration)**: declare structs, function signatures and
//!   variables; resolve type expressions, creating pending structs for
//!   forward references
//! - **Pass 2 (Type check)**: type every expression and infer `var` types
//! - **Code generation**: lower each function to a basic-block graph
//!
//! ## Modules
//!
//! - [`types`]: canonical types and the interning [`TypeDictionary`]
//! - [`scope`] / [`symbols`]: the name tables
//! - [`model`]: pass outputs and per-node decorations
//! - [`passes`]: the two analysis passes
//! - [`codegen`]: the instruction set and the function builder

pub mod codegen;
pub mod model;
mod options;
pub mod passes;
pub mod scope;
pub mod symbols;
pub mod types;

pub use codegen::{FunctionBuilder, FunctionCode};
pub use model::{CheckedModel, DeclaredModel, SemanticModel};
pub use options::CompilerOptions;
pub use passes::{DeclarationPass, TypeCheckPass};
pub use types::{TypeDictionary, TypeId};

pub use quill_core::CompilationError;

use quill_parser::ast::{Item, Program};
use tracing::debug;

/// A fully analyzed program with code attached to every function.
#[derive(Debug, Clone)]
pub struct CompiledModule {
    model: CheckedModel,
}

impl CompiledModule {
    pub fn model(&self) -> &CheckedModel {
        &self.model
    }

    /// Generated code of each function, in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionCode> + '_ {
        self.model
            .functions
            .iter()
            .filter_map(|&id| self.model.symbols.function(id))
            .filter_map(|f| f.code.as_ref())
    }

    /// Generated code of the function called `name`.
    pub fn function(&self, name: &str) -> Option<&FunctionCode> {
        self.model
            .global(name)
            .and_then(|id| self.model.symbols.function(id))
            .and_then(|f| f.code.as_ref())
    }

    /// Listing of every function, in declaration order.
    pub fn render(&self) -> String {
        self.functions().map(FunctionCode::render).collect()
    }
}

/// The compiler entry point.
pub struct Compiler;

impl Compiler {
    /// Analyze `program` and generate code for each of its functions.
    ///
    /// Stops at the first error.
    pub fn compile(
        program: &Program<'_>,
        options: CompilerOptions,
    ) -> Result<CompiledModule, CompilationError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("Compiler::compile");

        let declared = DeclarationPass::new().run(program)?;
        let mut model = TypeCheckPass::run(declared, program)?;

        let mut compiled = Vec::new();
        for item in program.items() {
            let Item::Func(decl) = item else {
                continue;
            };
            let Some(symbol) = model.decorations.symbol(decl.id) else {
                continue;
            };
            let code = FunctionBuilder::build(&model, symbol, decl, options)?;
            if options.verify_cfg
                && let Err(violation) = code.verify()
            {
                panic!("invalid control flow graph for '{}': {violation}", code.name);
            }
            debug!(
                function = %code.name,
                blocks = code.blocks().len(),
                locals = code.local_count(),
                "compiled function"
            );
            compiled.push((symbol, code));
        }

        for (symbol, code) in compiled {
            model.symbols_mut().attach_code(symbol, code);
        }
        Ok(CompiledModule { model })
    }
}
