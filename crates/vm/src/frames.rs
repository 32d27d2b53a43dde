//! Variable frames: the global frame, the transient temporary frame,
//! and the local-frame stack.
//!
//! A frame is a name → value mapping. A slot exists from DEFVAR onward
//! and holds [`Value::Undefined`] until first assignment. The active
//! local frame is mutated in place through the stack top; frames are
//! never copied out and re-pushed to write a single slot.

use std::collections::BTreeMap;
use std::fmt;

use ippvm_common::Value;

use crate::error::RuntimeError;

/// One variable scope.
pub type Frame = BTreeMap<String, Value>;

/// Which frame a variable address targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Global,
    Local,
    Temporary,
}

impl FrameKind {
    /// The two-letter source prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }
}

/// A parsed variable reference, `KIND@name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableAddress {
    pub frame: FrameKind,
    pub name: String,
}

impl VariableAddress {
    /// Parse a `KIND@name` address.
    ///
    /// A missing separator or empty name is a structural error; an
    /// unknown frame kind is an operand-value error.
    pub fn parse(text: &str) -> Result<Self, RuntimeError> {
        let (kind, name) = text
            .split_once('@')
            .ok_or_else(|| RuntimeError::MalformedVariable {
                text: text.to_string(),
            })?;
        if name.is_empty() {
            return Err(RuntimeError::MalformedVariable {
                text: text.to_string(),
            });
        }
        let frame = match kind {
            "GF" => FrameKind::Global,
            "LF" => FrameKind::Local,
            "TF" => FrameKind::Temporary,
            other => {
                return Err(RuntimeError::InvalidFrameKind {
                    kind: other.to_string(),
                })
            }
        };
        Ok(Self {
            frame,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for VariableAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame.prefix(), self.name)
    }
}

/// Owns all variable scopes for one run.
///
/// The global frame exists for the whole run. The temporary frame
/// exists only between CREATEFRAME and PUSHFRAME. Local frames are
/// pushed and popped explicitly, independent of call/return.
#[derive(Debug, Default)]
pub struct Frames {
    global: Frame,
    temporary: Option<Frame>,
    locals: Vec<Frame>,
}

impl Frames {
    pub fn new() -> Self {
        Self::default()
    }

    /// CREATEFRAME: replace the temporary frame with a fresh empty one,
    /// discarding any uncommitted predecessor.
    pub fn create_temporary(&mut self) {
        self.temporary = Some(Frame::new());
    }

    /// PUSHFRAME: move the temporary frame onto the local-frame stack.
    pub fn push_temporary(&mut self) -> Result<(), RuntimeError> {
        let frame = self.temporary.take().ok_or(RuntimeError::UndefinedFrame)?;
        self.locals.push(frame);
        Ok(())
    }

    /// POPFRAME: move the top local frame back into the temporary slot.
    pub fn pop_local(&mut self) -> Result<(), RuntimeError> {
        let frame = self.locals.pop().ok_or(RuntimeError::UndefinedFrame)?;
        self.temporary = Some(frame);
        Ok(())
    }

    fn frame(&self, kind: FrameKind) -> Result<&Frame, RuntimeError> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Local => self.locals.last().ok_or(RuntimeError::UndefinedFrame),
            FrameKind::Temporary => self.temporary.as_ref().ok_or(RuntimeError::UndefinedFrame),
        }
    }

    fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, RuntimeError> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Local => self.locals.last_mut().ok_or(RuntimeError::UndefinedFrame),
            FrameKind::Temporary => self.temporary.as_mut().ok_or(RuntimeError::UndefinedFrame),
        }
    }

    /// DEFVAR: declare a name, initially unassigned. Redeclaration in
    /// the same frame is an error, never an overwrite.
    pub fn define(&mut self, addr: &VariableAddress) -> Result<(), RuntimeError> {
        let frame = self.frame_mut(addr.frame)?;
        if frame.contains_key(&addr.name) {
            return Err(RuntimeError::VariableRedefined {
                name: addr.name.clone(),
            });
        }
        frame.insert(addr.name.clone(), Value::Undefined);
        Ok(())
    }

    /// Read a variable. With `allow_undefined`, an unassigned slot is
    /// returned as [`Value::Undefined`] instead of erroring (TYPE uses
    /// this); otherwise it is a value-access error.
    pub fn get(&self, addr: &VariableAddress, allow_undefined: bool) -> Result<Value, RuntimeError> {
        let frame = self.frame(addr.frame)?;
        let value = frame
            .get(&addr.name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: addr.name.clone(),
            })?;
        if value.is_undefined() && !allow_undefined {
            return Err(RuntimeError::UndefinedValue {
                name: addr.name.clone(),
            });
        }
        Ok(value.clone())
    }

    /// Write a variable. The name must already be declared in the
    /// target frame.
    pub fn set(&mut self, addr: &VariableAddress, value: Value) -> Result<(), RuntimeError> {
        let frame = self.frame_mut(addr.frame)?;
        let slot = frame
            .get_mut(&addr.name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: addr.name.clone(),
            })?;
        *slot = value;
        Ok(())
    }

    /// Snapshot one frame for BREAK, deterministically ordered.
    fn render_frame(frame: &Frame, out: &mut String) {
        if frame.is_empty() {
            out.push_str("  (empty)\n");
            return;
        }
        for (name, value) in frame {
            out.push_str(&format!("  {name} = {}@{value}\n", value.type_name()));
        }
    }

    /// Render the full frame state for BREAK.
    pub fn snapshot(&self) -> String {
        let mut out = String::new();
        out.push_str("global frame:\n");
        Self::render_frame(&self.global, &mut out);
        out.push_str("temporary frame:\n");
        match &self.temporary {
            Some(frame) => Self::render_frame(frame, &mut out),
            None => out.push_str("  (absent)\n"),
        }
        out.push_str(&format!("local frames ({}):\n", self.locals.len()));
        for frame in self.locals.iter().rev() {
            Self::render_frame(frame, &mut out);
        }
        out
    }
}
