//! Register-machine code generation.
//!
//! Each function is lowered independently into a [`FunctionCode`]: a graph
//! of [`BasicBlock`]s with a single entry (`L0`) and a single exit (`L1`).
//!
//! - [`Operand`] / [`Instruction`]: the instruction set
//! - [`RegisterMap`]: flat register numbering over a function's scopes
//! - [`FunctionBuilder`]: the lowering itself

mod block;
mod function_builder;
mod function_code;
mod instruction;
mod operand;
mod registers;

pub use block::{BasicBlock, BlockFlags};
pub use function_builder::FunctionBuilder;
pub use function_code::{CfgViolation, FunctionCode};
pub use instruction::{BlockId, Instruction};
pub use operand::Operand;
pub use registers::RegisterMap;
