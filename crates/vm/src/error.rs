//! Runtime errors for the IPPcode VM.
//!
//! Every error is fatal to the run: nothing is caught and retried
//! internally. Each kind maps to a distinct process exit status via
//! [`RuntimeError::exit_code`], which is the externally observable
//! protocol of the engine. Output already flushed before the failure
//! stays visible.

use thiserror::Error;

/// Errors that occur during program validation or execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Operand count does not match the opcode's signature.
    #[error("instruction {at}: {opcode} expects {expected} operand(s), got {found}")]
    BadOperandCount {
        at: usize,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// A literal's raw text could not be parsed (bad integer form,
    /// malformed `\DDD` escape).
    #[error("instruction {at}: invalid literal '{text}'")]
    InvalidLiteral { at: usize, text: String },

    /// A variable operand is not of the `KIND@name` shape.
    #[error("malformed variable '{text}'")]
    MalformedVariable { text: String },

    /// Two LABEL instructions declare the same name.
    #[error("duplicate label '{name}'")]
    DuplicateLabel { name: String },

    /// A jump or call targets a label that was never declared.
    #[error("undefined label '{name}'")]
    UndefinedLabel { name: String },

    /// An operator received a value of a tag it does not accept.
    #[error("instruction {at}: wrong operand type '{found}'")]
    WrongOperandType { at: usize, found: &'static str },

    /// Use of a name never declared in its frame.
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },

    /// DEFVAR on a name already declared in the same frame.
    #[error("variable '{name}' already defined")]
    VariableRedefined { name: String },

    /// Use of an absent temporary frame or an empty local-frame stack.
    #[error("undefined frame access")]
    UndefinedFrame,

    /// Read of a declared-but-unassigned variable.
    #[error("undefined value in variable '{name}'")]
    UndefinedValue { name: String },

    /// The frame kind in a `KIND@name` address is not GF, LF, or TF.
    #[error("invalid frame kind '{kind}'")]
    InvalidFrameKind { kind: String },

    /// IDIV with a zero divisor.
    #[error("instruction {at}: division by zero")]
    DivisionByZero { at: usize },

    /// INT2CHAR with an integer outside the Unicode scalar range.
    #[error("instruction {at}: invalid code point {value}")]
    InvalidCodepoint { at: usize, value: i64 },

    /// EXIT with a code outside [0, 9].
    #[error("instruction {at}: invalid exit code {code}")]
    InvalidExitCode { at: usize, code: i64 },

    /// READ with a type literal other than int, string, or bool.
    #[error("instruction {at}: invalid read type '{text}'")]
    InvalidReadType { at: usize, text: String },

    /// Character index outside `[0, length)` of the subject string.
    #[error("instruction {at}: index {index} out of range (length {length})")]
    IndexOutOfRange {
        at: usize,
        index: i64,
        length: usize,
    },

    /// SETCHAR with an empty replacement string.
    #[error("instruction {at}: empty replacement string")]
    EmptyReplacement { at: usize },

    /// RETURN with an empty call stack.
    #[error("instruction {at}: call stack underflow")]
    CallStackUnderflow { at: usize },

    /// POPS with an empty data stack.
    #[error("instruction {at}: data stack underflow")]
    DataStackUnderflow { at: usize },

    /// A declared opcode whose semantics are not implemented.
    #[error("instruction {at}: opcode {opcode} is not implemented")]
    NotImplemented { at: usize, opcode: &'static str },

    /// An output sink failed to accept a write.
    #[error("output error: {0}")]
    Io(String),
}

impl RuntimeError {
    /// The process exit status for this error kind.
    ///
    /// The 32/52..58 band follows the numbering of the original
    /// toolchain; call/data-stack underflow and not-implemented get
    /// their own codes so every kind stays distinguishable.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::BadOperandCount { .. }
            | RuntimeError::InvalidLiteral { .. }
            | RuntimeError::MalformedVariable { .. } => 32,
            RuntimeError::DuplicateLabel { .. } | RuntimeError::UndefinedLabel { .. } => 52,
            RuntimeError::WrongOperandType { .. } => 53,
            RuntimeError::UndefinedVariable { .. } | RuntimeError::VariableRedefined { .. } => 54,
            RuntimeError::UndefinedFrame => 55,
            RuntimeError::UndefinedValue { .. } => 56,
            RuntimeError::InvalidFrameKind { .. }
            | RuntimeError::DivisionByZero { .. }
            | RuntimeError::InvalidCodepoint { .. }
            | RuntimeError::InvalidExitCode { .. }
            | RuntimeError::InvalidReadType { .. } => 57,
            RuntimeError::IndexOutOfRange { .. } | RuntimeError::EmptyReplacement { .. } => 58,
            RuntimeError::CallStackUnderflow { .. } | RuntimeError::DataStackUnderflow { .. } => 59,
            RuntimeError::NotImplemented { .. } => 88,
            RuntimeError::Io(_) => 99,
        }
    }
}
