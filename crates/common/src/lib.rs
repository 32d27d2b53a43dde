//! IPPcode common types.
//!
//! This crate provides the foundational data structures shared by the
//! parser, the VM, and the CLI:
//!
//! - [`Opcode`] — the closed 35-opcode instruction set with operand
//!   signatures
//! - [`Operand`] / [`OperandKind`] / [`OperandSpec`] — loader-classified
//!   operands and the slot shapes opcodes expect
//! - [`Instruction`] — opcode plus dense operand array
//! - [`Value`] — the tagged runtime datum
//! - [`Program`] — an ordered, immutable instruction sequence
//!
//! # Dependencies
//!
//! This crate has no runtime dependencies. Error types live in the
//! crates that produce them (`ippvm-parser`, `ippvm-vm`).

pub mod instruction;
pub mod opcode;
pub mod operand;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use operand::{Operand, OperandKind, OperandSpec};
pub use program::Program;
pub use value::Value;
