//! Opcode definitions for the IPPcode instruction set.

use crate::operand::OperandSpec;

/// Identifies the operation to perform.
///
/// The instruction set is closed: dispatch is a total `match`, so an
/// unknown opcode cannot reach the execution engine. The six
/// comparison/boolean opcodes (LT..NOT) are declared members that fail
/// at execution time with a not-implemented error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames & variables
    /// Copy a resolved value into a variable.
    Move,
    /// Replace the temporary frame with a fresh empty frame.
    CreateFrame,
    /// Move the temporary frame onto the local-frame stack.
    PushFrame,
    /// Move the top local frame back into the temporary slot.
    PopFrame,
    /// Declare a variable in its frame, initially unassigned.
    Defvar,

    // Call & data stacks
    /// Push the return address and jump to a label.
    Call,
    /// Pop the call stack into the instruction pointer.
    Return,
    /// Push a resolved value onto the data stack.
    Pushs,
    /// Pop the data stack into a variable.
    Pops,

    // Arithmetic
    /// Integer addition.
    Add,
    /// Integer subtraction.
    Sub,
    /// Integer multiplication.
    Mul,
    /// Integer division, truncated toward zero.
    Idiv,

    // Comparison & boolean — declared but not implemented.
    Lt,
    Gt,
    Eq,
    And,
    Or,
    Not,

    // Conversions
    /// Integer to its Unicode character.
    Int2Char,
    /// Code point of the character at an index of a string.
    Stri2Int,

    // I/O
    /// Read one value of a named primitive type from the input capability.
    Read,
    /// Render a value to the output capability.
    Write,

    // Strings
    /// String concatenation.
    Concat,
    /// Character count of a string (code points, not bytes).
    Strlen,
    /// Single character at an index.
    Getchar,
    /// Replace one character of the destination string.
    Setchar,

    // Types
    /// Store the type name of a resolved value.
    Type,

    // Control flow
    /// Jump target marker; a no-op at execution time.
    Label,
    /// Unconditional jump to a label.
    Jump,
    /// Jump if two resolved values are equal.
    JumpIfEq,
    /// Jump if two resolved values are not equal.
    JumpIfNeq,
    /// Terminate with a validated exit code.
    Exit,

    // Diagnostics
    /// Write a value's textual form to the diagnostics sink.
    Dprint,
    /// Write the machine state snapshot to the diagnostics sink.
    Break,
}

/// All opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 35] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::Defvar,
    Opcode::Call,
    Opcode::Return,
    Opcode::Pushs,
    Opcode::Pops,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Idiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::Strlen,
    Opcode::Getchar,
    Opcode::Setchar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::Dprint,
    Opcode::Break,
];

use OperandSpec::{Label as SLabel, Symb, Type as SType, Var};

impl Opcode {
    /// Returns the source mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::Defvar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Pushs => "PUSHS",
            Opcode::Pops => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Idiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::Strlen => "STRLEN",
            Opcode::Getchar => "GETCHAR",
            Opcode::Setchar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::Dprint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Look up an opcode by mnemonic. Case-insensitive.
    pub fn from_mnemonic(text: &str) -> Option<Opcode> {
        let upper = text.to_uppercase();
        ALL_OPCODES.iter().copied().find(|op| op.mnemonic() == upper)
    }

    /// The fixed operand-slot shape of this opcode.
    ///
    /// Operand counts are checked against this before execution; a
    /// mismatch is a structural error.
    pub fn signature(&self) -> &'static [OperandSpec] {
        match self {
            Opcode::Move => &[Var, Symb],
            Opcode::CreateFrame => &[],
            Opcode::PushFrame => &[],
            Opcode::PopFrame => &[],
            Opcode::Defvar => &[Var],
            Opcode::Call => &[SLabel],
            Opcode::Return => &[],
            Opcode::Pushs => &[Symb],
            Opcode::Pops => &[Var],
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Idiv => &[Var, Symb, Symb],
            Opcode::Lt | Opcode::Gt | Opcode::Eq => &[Var, Symb, Symb],
            Opcode::And | Opcode::Or => &[Var, Symb, Symb],
            Opcode::Not => &[Var, Symb],
            Opcode::Int2Char => &[Var, Symb],
            Opcode::Stri2Int => &[Var, Symb, Symb],
            Opcode::Read => &[Var, SType],
            Opcode::Write => &[Symb],
            Opcode::Concat => &[Var, Symb, Symb],
            Opcode::Strlen => &[Var, Symb],
            Opcode::Getchar => &[Var, Symb, Symb],
            Opcode::Setchar => &[Var, Symb, Symb],
            Opcode::Type => &[Var, Symb],
            Opcode::Label => &[SLabel],
            Opcode::Jump => &[SLabel],
            Opcode::JumpIfEq | Opcode::JumpIfNeq => &[SLabel, Symb, Symb],
            Opcode::Exit => &[Symb],
            Opcode::Dprint => &[Symb],
            Opcode::Break => &[],
        }
    }

    /// Number of operand slots this opcode takes.
    pub fn arity(&self) -> usize {
        self.signature().len()
    }
}
