//! Semantic analysis passes.
//!
//! - [`DeclarationPass`]: declares structs, functions and variables
//! - [`TypeCheckPass`]: types every expression and variable
//!
//! Each pass consumes the previous pass's output type, so the passes can
//! only run in order.

mod declaration;
mod type_check;

pub use declaration::DeclarationPass;
pub use type_check::TypeCheckPass;
