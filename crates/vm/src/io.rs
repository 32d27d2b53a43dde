//! Input and output capabilities consumed by the engine.
//!
//! READ pulls one value per invocation from an [`Input`]; absence or an
//! unparseable value is reported as `None`, which the engine degrades
//! to nil rather than erroring. Writes go to one of two independently
//! addressable [`Output`] sinks (results and diagnostics); a failed
//! write is fatal.

use std::io::{BufRead, Write};

use crate::error::RuntimeError;

/// Source of values for READ.
pub trait Input {
    /// Next integer, or `None` if input is exhausted or unparseable.
    fn read_int(&mut self) -> Option<i64>;
    /// Next line as a string, or `None` if input is exhausted.
    fn read_string(&mut self) -> Option<String>;
    /// Next boolean, or `None` if input is exhausted. Any line other
    /// than a case-insensitive `true` reads as false.
    fn read_bool(&mut self) -> Option<bool>;
}

/// Sink for WRITE, DPRINT, and BREAK.
pub trait Output {
    fn write_str(&mut self, s: &str) -> Result<(), RuntimeError>;

    fn write_int(&mut self, value: i64) -> Result<(), RuntimeError> {
        self.write_str(&value.to_string())
    }

    fn write_bool(&mut self, value: bool) -> Result<(), RuntimeError> {
        self.write_str(if value { "true" } else { "false" })
    }
}

impl<W: Write> Output for W {
    fn write_str(&mut self, s: &str) -> Result<(), RuntimeError> {
        self.write_all(s.as_bytes())
            .map_err(|e| RuntimeError::Io(e.to_string()))
    }
}

/// Line-oriented input: one value per line, as the environment feeds
/// the interpreter.
pub struct LineInput<R: BufRead> {
    reader: R,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Next line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }
}

impl<R: BufRead> Input for LineInput<R> {
    fn read_int(&mut self) -> Option<i64> {
        self.next_line()?.trim().parse::<i64>().ok()
    }

    fn read_string(&mut self) -> Option<String> {
        self.next_line()
    }

    fn read_bool(&mut self) -> Option<bool> {
        let line = self.next_line()?;
        Some(line.trim().eq_ignore_ascii_case("true"))
    }
}
