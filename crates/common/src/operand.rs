//! Operand representation for IPPcode instructions.
//!
//! The loader classifies every operand into a kind and trims its raw
//! text payload. The execution engine trusts the kind tags but
//! re-validates value constraints (numeric parse, range, frame kind)
//! at the point of use.

use std::fmt;

/// Classification assigned to an operand by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// A variable reference, `KIND@name`.
    Var,
    /// A jump target name.
    Label,
    /// An integer literal (decimal, hex, or octal text).
    Int,
    /// A boolean literal, `true` or `false`.
    Bool,
    /// A string literal with `\DDD` escapes left intact.
    String,
    /// The nil literal.
    Nil,
    /// A type name used by READ: `int`, `string`, or `bool`.
    Type,
}

impl OperandKind {
    /// The source name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            OperandKind::Var => "var",
            OperandKind::Label => "label",
            OperandKind::Int => "int",
            OperandKind::Bool => "bool",
            OperandKind::String => "string",
            OperandKind::Nil => "nil",
            OperandKind::Type => "type",
        }
    }
}

/// The operand-slot shape an opcode expects at each position.
///
/// `Symb` admits either a variable reference or a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandSpec {
    Var,
    Symb,
    Label,
    Type,
}

/// One classified operand: kind plus trimmed raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub kind: OperandKind,
    pub text: String,
}

impl Operand {
    pub fn new(kind: OperandKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn var(text: impl Into<String>) -> Self {
        Self::new(OperandKind::Var, text)
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self::new(OperandKind::Label, text)
    }

    pub fn int(text: impl Into<String>) -> Self {
        Self::new(OperandKind::Int, text)
    }

    pub fn bool_lit(text: impl Into<String>) -> Self {
        Self::new(OperandKind::Bool, text)
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::new(OperandKind::String, text)
    }

    pub fn nil() -> Self {
        Self::new(OperandKind::Nil, "nil")
    }

    pub fn type_name(text: impl Into<String>) -> Self {
        Self::new(OperandKind::Type, text)
    }

    /// True when this operand satisfies the given slot shape.
    pub fn matches(&self, spec: OperandSpec) -> bool {
        match spec {
            OperandSpec::Var => self.kind == OperandKind::Var,
            OperandSpec::Label => self.kind == OperandKind::Label,
            OperandSpec::Type => self.kind == OperandKind::Type,
            OperandSpec::Symb => matches!(
                self.kind,
                OperandKind::Var
                    | OperandKind::Int
                    | OperandKind::Bool
                    | OperandKind::String
                    | OperandKind::Nil
            ),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            // A var already carries its frame prefix.
            OperandKind::Var => write!(f, "{}", self.text),
            OperandKind::Label | OperandKind::Type => write!(f, "{}", self.text),
            _ => write!(f, "{}@{}", self.kind.name(), self.text),
        }
    }
}
