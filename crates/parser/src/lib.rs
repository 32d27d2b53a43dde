//! IPPcode source loader.
//!
//! Turns textual IPPcode (a `.IPPcode24` header followed by one
//! instruction per line) into an [`ippvm_common::Program`] ready for
//! the execution engine. Structure is fully checked here; literal
//! payloads are carried raw and validated by the engine at use.
//!
//! # Example
//!
//! ```
//! let program = ippvm_parser::parse(
//!     ".IPPcode24\n\
//!      DEFVAR GF@greeting\n\
//!      MOVE GF@greeting string@hello\n\
//!      WRITE GF@greeting\n",
//! )
//! .unwrap();
//! assert_eq!(program.len(), 3);
//! ```

pub mod error;
mod lexer;
pub mod parser;

pub use error::ParseError;
pub use parser::parse;
