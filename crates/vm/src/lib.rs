//! IPPcode execution engine.
//!
//! The engine validates a loaded [`Program`] (operand counts, duplicate
//! labels) and then interprets it against three variable frames, a data
//! stack, and a call stack. All I/O goes through the [`io::Input`] and
//! [`io::Output`] capabilities, so embedders control where READ pulls
//! from and where WRITE, DPRINT, and BREAK land.
//!
//! # Example
//!
//! ```
//! use ippvm_common::{Instruction, Opcode, Operand, Program};
//! use ippvm_vm::io::LineInput;
//!
//! let program = Program::new(vec![
//!     Instruction::new(Opcode::Defvar, vec![Operand::var("GF@x")]),
//!     Instruction::new(Opcode::Move, vec![Operand::var("GF@x"), Operand::int("40")]),
//!     Instruction::new(Opcode::Defvar, vec![Operand::var("GF@y")]),
//!     Instruction::new(
//!         Opcode::Add,
//!         vec![Operand::var("GF@y"), Operand::var("GF@x"), Operand::int("2")],
//!     ),
//!     Instruction::new(Opcode::Write, vec![Operand::var("GF@y")]),
//! ]);
//!
//! let mut input = LineInput::new(&b""[..]);
//! let mut out: Vec<u8> = Vec::new();
//! let mut diag: Vec<u8> = Vec::new();
//! let status = ippvm_vm::run(&program, &mut input, &mut out, &mut diag).unwrap();
//! assert_eq!(status, 0);
//! assert_eq!(out, b"42");
//! ```

pub mod error;
pub mod execute;
pub mod frames;
pub mod io;
pub mod machine;

pub use error::RuntimeError;
pub use frames::{Frame, FrameKind, Frames, VariableAddress};
pub use machine::Vm;

use ippvm_common::Program;

/// Validate and execute a program to completion.
///
/// Returns the program's exit status: 0 on fall-off, or the code an
/// EXIT instruction supplied. Any error aborts the run; output written
/// before the failure stays in the sinks.
pub fn run(
    program: &Program,
    input: &mut dyn io::Input,
    stdout: &mut dyn io::Output,
    stderr: &mut dyn io::Output,
) -> Result<i32, RuntimeError> {
    let mut vm = Vm::new(program, input, stdout, stderr);
    vm.execute()
}

/// Run only the pre-execution validation passes: operand counts and
/// duplicate-label detection. Label targets stay unchecked; they
/// resolve lazily at jump time.
pub fn check(program: &Program) -> Result<(), RuntimeError> {
    machine::check_operand_counts(program)?;
    machine::build_label_table(program)?;
    Ok(())
}
