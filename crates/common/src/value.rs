//! Runtime value representation for the IPPcode VM.
//!
//! Values live in frame slots and on the data stack. They are immutable
//! once constructed: assignment replaces the whole slot.

use std::fmt;

/// A tagged runtime datum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Sequence of Unicode code points.
    Str(String),
    /// The nil value.
    Nil,
    /// A label name. Part of the value model; operators reject it.
    Label(String),
    /// A declared-but-unassigned slot. Rejected on read unless the
    /// caller opts into observing it (TYPE does).
    Undefined,
}

impl Value {
    /// The source type name of this value's tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Nil => "nil",
            Value::Label(_) => "label",
            Value::Undefined => "undefined",
        }
    }

    /// True if this slot has never been assigned.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }
}

/// Diagnostic rendering, used by DPRINT and BREAK. Nil prints as `nil`
/// (unlike WRITE, where it is the empty string).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(true) => write!(f, "true"),
            Value::Bool(false) => write!(f, "false"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Nil => write!(f, "nil"),
            Value::Label(name) => write!(f, "{name}"),
            Value::Undefined => Ok(()),
        }
    }
}
