//! Instruction representation for the IPPcode instruction set.

use std::fmt;

use crate::opcode::Opcode;
use crate::operand::Operand;

/// A single instruction: opcode plus a dense operand array.
///
/// The loader has already normalized operand slots to a 0-indexed
/// contiguous array; the engine checks the count against the opcode's
/// signature before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Self { opcode, operands }
    }

    /// An instruction with no operands.
    pub fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, Vec::new())
    }
}

/// Canonical one-line listing form: `OPCODE operand operand ...`.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode.mnemonic())?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}
