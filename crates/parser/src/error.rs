//! Load-time errors for IPPcode source text.

use thiserror::Error;

/// Errors reported while loading source into a program.
///
/// Line numbers are 1-based and refer to the physical source line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The source does not open with the `.IPPcode24` header.
    #[error("missing or malformed .IPPcode24 header")]
    MissingHeader,

    /// The first word of a line is not a known mnemonic.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An instruction carries the wrong number of operands.
    #[error("line {line}: {opcode} expects {expected} operand(s), got {found}")]
    WrongOperandCount {
        line: usize,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// An operand token does not fit the slot its opcode declares.
    #[error("line {line}: invalid operand '{token}'")]
    InvalidOperand { line: usize, token: String },
}

impl ParseError {
    /// The process exit status for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ParseError::MissingHeader => 21,
            ParseError::UnknownOpcode { .. } => 22,
            ParseError::WrongOperandCount { .. } | ParseError::InvalidOperand { .. } => 23,
        }
    }
}
