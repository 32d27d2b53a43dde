//! Program representation for IPPcode instruction sequences.

use crate::instruction::Instruction;

/// An ordered, immutable instruction sequence.
///
/// Instructions are 0-indexed and gap-free; the loader has already
/// sorted them by declared order and rejected duplicates. The engine's
/// instruction pointer is valid for `[0, len)`, and running off the end
/// is normal termination.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
