//! Classification of token lines into instructions.
//!
//! The parser checks structure only: the header, known mnemonics,
//! operand counts, and which slot shape each token fits. Value-level
//! validation (numeric forms, escape sequences, frame kinds, ranges)
//! is deferred to the execution engine, which re-checks payloads at
//! the point of use.

use ippvm_common::{Instruction, Opcode, Operand, OperandSpec, Program};

use crate::error::ParseError;
use crate::lexer::{token_lines, Line};

/// The required header, compared case-insensitively.
const HEADER: &str = ".ippcode24";

/// Parse complete source text into a program.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let lines = token_lines(source);
    let mut lines = lines.into_iter();

    match lines.next() {
        Some(line) if is_header(&line) => {}
        _ => return Err(ParseError::MissingHeader),
    }

    let mut instructions = Vec::new();
    for line in lines {
        instructions.push(parse_line(&line)?);
    }
    Ok(Program::new(instructions))
}

fn is_header(line: &Line<'_>) -> bool {
    line.tokens.len() == 1 && line.tokens[0].to_lowercase() == HEADER
}

fn parse_line(line: &Line<'_>) -> Result<Instruction, ParseError> {
    let mnemonic = line.tokens[0];
    let opcode =
        Opcode::from_mnemonic(mnemonic).ok_or_else(|| ParseError::UnknownOpcode {
            line: line.number,
            token: mnemonic.to_string(),
        })?;

    let signature = opcode.signature();
    let found = line.tokens.len() - 1;
    if found != signature.len() {
        return Err(ParseError::WrongOperandCount {
            line: line.number,
            opcode: opcode.mnemonic(),
            expected: signature.len(),
            found,
        });
    }

    let operands = line.tokens[1..]
        .iter()
        .zip(signature)
        .map(|(token, spec)| classify(token, *spec, line.number))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Instruction::new(opcode, operands))
}

/// Fit one token to the slot shape its opcode declares.
fn classify(token: &str, spec: OperandSpec, line: usize) -> Result<Operand, ParseError> {
    let invalid = || ParseError::InvalidOperand {
        line,
        token: token.to_string(),
    };
    match spec {
        OperandSpec::Var => {
            if is_var(token) {
                Ok(Operand::var(token))
            } else {
                Err(invalid())
            }
        }
        OperandSpec::Symb => {
            if is_var(token) {
                return Ok(Operand::var(token));
            }
            let (tag, payload) = token.split_once('@').ok_or_else(invalid)?;
            match tag {
                "int" if !payload.is_empty() => Ok(Operand::int(payload)),
                "bool" if payload == "true" || payload == "false" => {
                    Ok(Operand::bool_lit(payload))
                }
                // String payloads may be empty; escapes stay raw here.
                "string" => Ok(Operand::string(payload)),
                "nil" if payload == "nil" => Ok(Operand::nil()),
                _ => Err(invalid()),
            }
        }
        OperandSpec::Label => {
            if token.contains('@') {
                Err(invalid())
            } else {
                Ok(Operand::label(token))
            }
        }
        OperandSpec::Type => match token {
            "int" | "string" | "bool" => Ok(Operand::type_name(token)),
            _ => Err(invalid()),
        },
    }
}

/// Variable references carry an uppercase frame prefix.
fn is_var(token: &str) -> bool {
    token.starts_with("GF@") || token.starts_with("LF@") || token.starts_with("TF@")
}
