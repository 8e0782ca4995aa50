//! Code generation options.

/// Knobs for [`Compiler::compile`](crate::Compiler::compile).
///
/// ```
/// use quill_compiler::CompilerOptions;
///
/// let options = CompilerOptions::new().with_constant_folding(false);
/// assert!(!options.fold_constants);
/// assert!(options.verify_cfg);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Evaluate operators on constant operands at compile time.
    pub fold_constants: bool,
    /// Check every generated graph with [`FunctionCode::verify`] and panic
    /// on a violation.
    ///
    /// [`FunctionCode::verify`]: crate::codegen::FunctionCode::verify
    pub verify_cfg: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            fold_constants: true,
            verify_cfg: true,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constant_folding(mut self, enabled: bool) -> Self {
        self.fold_constants = enabled;
        self
    }

    pub fn with_cfg_verification(mut self, enabled: bool) -> Self {
        self.verify_cfg = enabled;
        self
    }
}
