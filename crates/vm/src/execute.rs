//! The dispatch loop and per-opcode handlers.
//!
//! Execution runs two pre-passes (operand counts, label table) and then
//! steps one instruction at a time. Literal payloads are validated
//! lazily, at first resolution: a malformed literal in a branch that is
//! never taken never fails the run.

use ippvm_common::{Instruction, Opcode, Operand, OperandKind, Value};

use crate::error::RuntimeError;
use crate::machine::{build_label_table, check_operand_counts, instruction_at, Vm};

/// What the dispatch loop does after one instruction.
enum Step {
    /// Fall through to the next instruction.
    Next,
    /// Transfer control to the given instruction index.
    Jump(usize),
    /// Stop the run with the given status.
    Exit(i32),
}

/// Parse an integer literal: decimal, `0x`/`0X` hex, `0o`/`0O` octal,
/// or leading-zero octal.
pub(crate) fn parse_int_literal(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'+' => (false, &text[1..]),
        b'-' => (true, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        if hex.starts_with(['+', '-']) {
            return None;
        }
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = digits
        .strip_prefix("0o")
        .or_else(|| digits.strip_prefix("0O"))
    {
        if oct.starts_with(['+', '-']) {
            return None;
        }
        i64::from_str_radix(oct, 8).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { magnitude.wrapping_neg() } else { magnitude })
}

/// Decode `\DDD` escapes: a backslash followed by exactly three decimal
/// digits naming a code point. Anything else after a backslash is
/// malformed.
pub(crate) fn decode_escapes(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut code = 0u32;
        for _ in 0..3 {
            code = code * 10 + chars.next()?.to_digit(10)?;
        }
        out.push(char::from_u32(code)?);
    }
    Some(out)
}

impl<'a> Vm<'a> {
    /// Validate the program and run it to completion.
    ///
    /// Falling off the end of the program is a normal stop with status
    /// 0; EXIT stops with its validated code.
    pub fn execute(&mut self) -> Result<i32, RuntimeError> {
        check_operand_counts(self.program)?;
        self.labels = build_label_table(self.program)?;
        let program = self.program;
        while let Some(instr) = instruction_at(program, self.ip) {
            match self.step(instr)? {
                Step::Next => self.ip += 1,
                Step::Jump(target) => self.ip = target,
                Step::Exit(code) => return Ok(code),
            }
        }
        Ok(0)
    }

    fn step(&mut self, instr: &Instruction) -> Result<Step, RuntimeError> {
        match instr.opcode {
            Opcode::Move => self.exec_move(instr)?,
            Opcode::CreateFrame => self.frames.create_temporary(),
            Opcode::PushFrame => self.frames.push_temporary()?,
            Opcode::PopFrame => self.frames.pop_local()?,
            Opcode::Defvar => self.exec_defvar(instr)?,
            Opcode::Call => return self.exec_call(instr),
            Opcode::Return => return self.exec_return(),
            Opcode::Pushs => self.exec_pushs(instr)?,
            Opcode::Pops => self.exec_pops(instr)?,
            Opcode::Add => self.exec_arith(instr, i64::wrapping_add)?,
            Opcode::Sub => self.exec_arith(instr, i64::wrapping_sub)?,
            Opcode::Mul => self.exec_arith(instr, i64::wrapping_mul)?,
            Opcode::Idiv => self.exec_idiv(instr)?,
            // Declared in the instruction set but outside the executable
            // subset; reaching one is fatal with its own status.
            Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Not => {
                return Err(RuntimeError::NotImplemented {
                    at: self.ip,
                    opcode: instr.opcode.mnemonic(),
                })
            }
            Opcode::Int2Char => self.exec_int2char(instr)?,
            Opcode::Stri2Int => self.exec_stri2int(instr)?,
            Opcode::Read => self.exec_read(instr)?,
            Opcode::Write => self.exec_write(instr)?,
            Opcode::Concat => self.exec_concat(instr)?,
            Opcode::Strlen => self.exec_strlen(instr)?,
            Opcode::Getchar => self.exec_getchar(instr)?,
            Opcode::Setchar => self.exec_setchar(instr)?,
            Opcode::Type => self.exec_type(instr)?,
            // Labels were consumed by the pre-pass; executing one (as a
            // jump or call target, or by fall-through) does nothing.
            Opcode::Label => {}
            Opcode::Jump => return Ok(Step::Jump(self.label_target(&instr.operands[0])?)),
            Opcode::JumpIfEq => return self.exec_jump_if(instr, true),
            Opcode::JumpIfNeq => return self.exec_jump_if(instr, false),
            Opcode::Exit => return self.exec_exit(instr),
            Opcode::Dprint => self.exec_dprint(instr)?,
            Opcode::Break => self.exec_break()?,
        }
        Ok(Step::Next)
    }

    /// Resolve a symb operand to a value: read the variable, or parse
    /// the literal payload.
    fn resolve(&self, operand: &Operand) -> Result<Value, RuntimeError> {
        match operand.kind {
            OperandKind::Var => {
                let addr = self.var_addr(operand)?;
                self.frames.get(&addr, false)
            }
            OperandKind::Int => parse_int_literal(&operand.text).map(Value::Int).ok_or_else(
                || RuntimeError::InvalidLiteral {
                    at: self.ip,
                    text: operand.text.clone(),
                },
            ),
            OperandKind::Bool => Ok(Value::Bool(operand.text == "true")),
            OperandKind::String => decode_escapes(&operand.text).map(Value::Str).ok_or_else(
                || RuntimeError::InvalidLiteral {
                    at: self.ip,
                    text: operand.text.clone(),
                },
            ),
            OperandKind::Nil => Ok(Value::Nil),
            OperandKind::Label | OperandKind::Type => Err(RuntimeError::WrongOperandType {
                at: self.ip,
                found: operand.kind.name(),
            }),
        }
    }

    fn as_int(&self, value: Value) -> Result<i64, RuntimeError> {
        match value {
            Value::Int(v) => Ok(v),
            other => Err(RuntimeError::WrongOperandType {
                at: self.ip,
                found: other.type_name(),
            }),
        }
    }

    fn as_str(&self, value: Value) -> Result<String, RuntimeError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(RuntimeError::WrongOperandType {
                at: self.ip,
                found: other.type_name(),
            }),
        }
    }

    /// Character at `index`, counting scalar values, with a range check.
    fn char_at(&self, s: &str, index: i64) -> Result<char, RuntimeError> {
        let length = s.chars().count();
        let out_of_range = RuntimeError::IndexOutOfRange {
            at: self.ip,
            index,
            length,
        };
        let i = usize::try_from(index)
            .ok()
            .filter(|&i| i < length)
            .ok_or_else(|| out_of_range.clone())?;
        s.chars().nth(i).ok_or(out_of_range)
    }

    fn exec_move(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.resolve(&instr.operands[1])?;
        let addr = self.var_addr(&instr.operands[0])?;
        self.frames.set(&addr, value)
    }

    fn exec_defvar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let addr = self.var_addr(&instr.operands[0])?;
        self.frames.define(&addr)
    }

    fn exec_call(&mut self, instr: &Instruction) -> Result<Step, RuntimeError> {
        let target = self.label_target(&instr.operands[0])?;
        self.call_stack.push(self.ip + 1);
        Ok(Step::Jump(target))
    }

    fn exec_return(&mut self) -> Result<Step, RuntimeError> {
        let target = self.pop_call()?;
        Ok(Step::Jump(target))
    }

    fn exec_pushs(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.resolve(&instr.operands[0])?;
        self.data_stack.push(value);
        Ok(())
    }

    fn exec_pops(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.pop_data()?;
        let addr = self.var_addr(&instr.operands[0])?;
        self.frames.set(&addr, value)
    }

    fn exec_arith(
        &mut self,
        instr: &Instruction,
        op: fn(i64, i64) -> i64,
    ) -> Result<(), RuntimeError> {
        let a = self.as_int(self.resolve(&instr.operands[1])?)?;
        let b = self.as_int(self.resolve(&instr.operands[2])?)?;
        let addr = self.var_addr(&instr.operands[0])?;
        self.frames.set(&addr, Value::Int(op(a, b)))
    }

    fn exec_idiv(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let a = self.as_int(self.resolve(&instr.operands[1])?)?;
        let b = self.as_int(self.resolve(&instr.operands[2])?)?;
        if b == 0 {
            return Err(RuntimeError::DivisionByZero { at: self.ip });
        }
        let addr = self.var_addr(&instr.operands[0])?;
        // Truncating division; i64::MIN / -1 wraps rather than traps.
        self.frames.set(&addr, Value::Int(a.wrapping_div(b)))
    }

    fn exec_int2char(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.as_int(self.resolve(&instr.operands[1])?)?;
        let c = u32::try_from(value)
            .ok()
            .and_then(char::from_u32)
            .ok_or(RuntimeError::InvalidCodepoint { at: self.ip, value })?;
        let addr = self.var_addr(&instr.operands[0])?;
        self.frames.set(&addr, Value::Str(c.to_string()))
    }

    fn exec_stri2int(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let s = self.as_str(self.resolve(&instr.operands[1])?)?;
        let index = self.as_int(self.resolve(&instr.operands[2])?)?;
        let c = self.char_at(&s, index)?;
        let addr = self.var_addr(&instr.operands[0])?;
        self.frames.set(&addr, Value::Int(i64::from(c as u32)))
    }

    fn exec_read(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let addr = self.var_addr(&instr.operands[0])?;
        let requested = &instr.operands[1].text;
        let value = match requested.as_str() {
            "int" => self.input.read_int().map(Value::Int),
            "string" => self.input.read_string().map(Value::Str),
            "bool" => self.input.read_bool().map(Value::Bool),
            other => {
                return Err(RuntimeError::InvalidReadType {
                    at: self.ip,
                    text: other.to_string(),
                })
            }
        };
        // Exhausted or unparseable input degrades to nil.
        self.frames.set(&addr, value.unwrap_or(Value::Nil))
    }

    fn exec_write(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.resolve(&instr.operands[0])?;
        match value {
            Value::Int(v) => self.stdout.write_int(v),
            Value::Bool(b) => self.stdout.write_bool(b),
            Value::Str(s) => self.stdout.write_str(&s),
            Value::Nil => self.stdout.write_str(""),
            other => Err(RuntimeError::WrongOperandType {
                at: self.ip,
                found: other.type_name(),
            }),
        }
    }

    fn exec_concat(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let mut a = self.as_str(self.resolve(&instr.operands[1])?)?;
        let b = self.as_str(self.resolve(&instr.operands[2])?)?;
        a.push_str(&b);
        let addr = self.var_addr(&instr.operands[0])?;
        self.frames.set(&addr, Value::Str(a))
    }

    fn exec_strlen(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let s = self.as_str(self.resolve(&instr.operands[1])?)?;
        let addr = self.var_addr(&instr.operands[0])?;
        self.frames.set(&addr, Value::Int(s.chars().count() as i64))
    }

    fn exec_getchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let s = self.as_str(self.resolve(&instr.operands[1])?)?;
        let index = self.as_int(self.resolve(&instr.operands[2])?)?;
        let c = self.char_at(&s, index)?;
        let addr = self.var_addr(&instr.operands[0])?;
        self.frames.set(&addr, Value::Str(c.to_string()))
    }

    fn exec_setchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let addr = self.var_addr(&instr.operands[0])?;
        let current = self.as_str(self.frames.get(&addr, false)?)?;
        let index = self.as_int(self.resolve(&instr.operands[1])?)?;
        let replacement = self.as_str(self.resolve(&instr.operands[2])?)?;
        let Some(rc) = replacement.chars().next() else {
            return Err(RuntimeError::EmptyReplacement { at: self.ip });
        };
        // Range-check against the target before rebuilding it.
        self.char_at(&current, index)?;
        let target = index as usize;
        let mut out = String::with_capacity(current.len());
        for (i, c) in current.chars().enumerate() {
            out.push(if i == target { rc } else { c });
        }
        self.frames.set(&addr, Value::Str(out))
    }

    fn exec_type(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let source = &instr.operands[1];
        // TYPE is the one reader allowed to observe a declared but
        // unassigned variable; it reports it as the empty string.
        let value = if source.kind == OperandKind::Var {
            let addr = self.var_addr(source)?;
            self.frames.get(&addr, true)?
        } else {
            self.resolve(source)?
        };
        let name = if value.is_undefined() {
            ""
        } else {
            value.type_name()
        };
        let addr = self.var_addr(&instr.operands[0])?;
        self.frames.set(&addr, Value::Str(name.to_string()))
    }

    fn exec_jump_if(&mut self, instr: &Instruction, want_equal: bool) -> Result<Step, RuntimeError> {
        let target = self.label_target(&instr.operands[0])?;
        let a = self.resolve(&instr.operands[1])?;
        let b = self.resolve(&instr.operands[2])?;
        // Nil compares with anything (equal only to nil); any other tag
        // mismatch is a type error.
        let equal = match (&a, &b) {
            (Value::Nil, _) | (_, Value::Nil) => a == b,
            _ if a.type_name() != b.type_name() => {
                return Err(RuntimeError::WrongOperandType {
                    at: self.ip,
                    found: b.type_name(),
                })
            }
            _ => a == b,
        };
        Ok(if equal == want_equal {
            Step::Jump(target)
        } else {
            Step::Next
        })
    }

    fn exec_exit(&mut self, instr: &Instruction) -> Result<Step, RuntimeError> {
        let code = self.as_int(self.resolve(&instr.operands[0])?)?;
        if !(0..=9).contains(&code) {
            return Err(RuntimeError::InvalidExitCode { at: self.ip, code });
        }
        Ok(Step::Exit(code as i32))
    }

    fn exec_dprint(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.resolve(&instr.operands[0])?;
        self.stderr.write_str(&format!("{value}\n"))
    }

    fn exec_break(&mut self) -> Result<(), RuntimeError> {
        let mut report = String::new();
        report.push_str(&format!("instruction pointer: {}\n", self.ip));
        report.push_str(&self.frames.snapshot());
        report.push_str(&format!("data stack ({}):\n", self.data_stack.len()));
        for value in self.data_stack.iter().rev() {
            report.push_str(&format!("  {}@{value}\n", value.type_name()));
        }
        report.push_str(&format!("call stack ({}):\n", self.call_stack.len()));
        for address in self.call_stack.iter().rev() {
            report.push_str(&format!("  {address}\n"));
        }
        self.stderr.write_str(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::LineInput;
    use ippvm_common::Program;
    use std::io::Cursor;

    fn run(
        instructions: Vec<Instruction>,
        input: &str,
    ) -> (Result<i32, RuntimeError>, String, String) {
        let program = Program::new(instructions);
        let mut input = LineInput::new(Cursor::new(input.to_string().into_bytes()));
        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        let result = {
            let mut vm = Vm::new(&program, &mut input, &mut out, &mut err);
            vm.execute()
        };
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn i(op: Opcode, operands: Vec<Operand>) -> Instruction {
        Instruction::new(op, operands)
    }

    #[test]
    fn int_literal_forms() {
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("-7"), Some(-7));
        assert_eq!(parse_int_literal("+7"), Some(7));
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("0x1F"), Some(31));
        assert_eq!(parse_int_literal("0XfF"), Some(255));
        assert_eq!(parse_int_literal("-0x10"), Some(-16));
        assert_eq!(parse_int_literal("0o17"), Some(15));
        assert_eq!(parse_int_literal("017"), Some(15));
        assert_eq!(parse_int_literal("00"), Some(0));
    }

    #[test]
    fn int_literal_rejections() {
        assert_eq!(parse_int_literal(""), None);
        assert_eq!(parse_int_literal("-"), None);
        assert_eq!(parse_int_literal("--5"), None);
        assert_eq!(parse_int_literal("abc"), None);
        assert_eq!(parse_int_literal("1 2"), None);
        assert_eq!(parse_int_literal("0x"), None);
        assert_eq!(parse_int_literal("0x-5"), None);
        assert_eq!(parse_int_literal("09"), None);
        assert_eq!(parse_int_literal("1.5"), None);
    }

    #[test]
    fn escape_decoding() {
        assert_eq!(decode_escapes("plain"), Some("plain".to_string()));
        assert_eq!(decode_escapes("a\\032b"), Some("a b".to_string()));
        assert_eq!(decode_escapes("\\092"), Some("\\".to_string()));
        assert_eq!(decode_escapes("\\010"), Some("\n".to_string()));
        assert_eq!(decode_escapes(""), Some(String::new()));
    }

    #[test]
    fn escape_rejections() {
        assert_eq!(decode_escapes("\\"), None);
        assert_eq!(decode_escapes("\\1"), None);
        assert_eq!(decode_escapes("\\12"), None);
        assert_eq!(decode_escapes("\\abc"), None);
        assert_eq!(decode_escapes("trailing\\0"), None);
    }

    #[test]
    fn move_and_write() {
        let (result, out, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@x")]),
                i(
                    Opcode::Move,
                    vec![Operand::var("GF@x"), Operand::int("5")],
                ),
                i(Opcode::Write, vec![Operand::var("GF@x")]),
            ],
            "",
        );
        assert_eq!(result, Ok(0));
        assert_eq!(out, "5");
    }

    #[test]
    fn write_forms() {
        let (result, out, _) = run(
            vec![
                i(Opcode::Write, vec![Operand::bool_lit("true")]),
                i(Opcode::Write, vec![Operand::nil()]),
                i(Opcode::Write, vec![Operand::string("a\\032b")]),
                i(Opcode::Write, vec![Operand::int("-0x10")]),
            ],
            "",
        );
        assert_eq!(result, Ok(0));
        assert_eq!(out, "truea b-16");
    }

    #[test]
    fn arithmetic_wraps_and_truncates() {
        let (result, out, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@r")]),
                i(
                    Opcode::Idiv,
                    vec![Operand::var("GF@r"), Operand::int("-7"), Operand::int("2")],
                ),
                i(Opcode::Write, vec![Operand::var("GF@r")]),
            ],
            "",
        );
        assert_eq!(result, Ok(0));
        // Truncation toward zero.
        assert_eq!(out, "-3");
    }

    #[test]
    fn idiv_by_zero() {
        let (result, _, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@r")]),
                i(
                    Opcode::Idiv,
                    vec![Operand::var("GF@r"), Operand::int("1"), Operand::int("0")],
                ),
            ],
            "",
        );
        assert_eq!(result, Err(RuntimeError::DivisionByZero { at: 1 }));
    }

    #[test]
    fn arith_type_error_reports_found_tag() {
        let (result, _, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@r")]),
                i(
                    Opcode::Add,
                    vec![
                        Operand::var("GF@r"),
                        Operand::string("1"),
                        Operand::int("2"),
                    ],
                ),
            ],
            "",
        );
        assert_eq!(
            result,
            Err(RuntimeError::WrongOperandType {
                at: 1,
                found: "string"
            })
        );
    }

    #[test]
    fn jump_skips_straight_line_code() {
        let (result, out, _) = run(
            vec![
                i(Opcode::Jump, vec![Operand::label("end")]),
                i(Opcode::Write, vec![Operand::string("skipped")]),
                i(Opcode::Label, vec![Operand::label("end")]),
                i(Opcode::Write, vec![Operand::string("done")]),
            ],
            "",
        );
        assert_eq!(result, Ok(0));
        assert_eq!(out, "done");
    }

    #[test]
    fn call_and_return() {
        let (result, out, _) = run(
            vec![
                i(Opcode::Call, vec![Operand::label("sub")]),
                i(Opcode::Write, vec![Operand::string("back")]),
                i(
                    Opcode::Exit,
                    vec![Operand::int("0")],
                ),
                i(Opcode::Label, vec![Operand::label("sub")]),
                i(Opcode::Write, vec![Operand::string("in ")]),
                i(Opcode::Return, vec![]),
            ],
            "",
        );
        assert_eq!(result, Ok(0));
        assert_eq!(out, "in back");
    }

    #[test]
    fn return_without_call_underflows() {
        let (result, _, _) = run(vec![i(Opcode::Return, vec![])], "");
        assert_eq!(result, Err(RuntimeError::CallStackUnderflow { at: 0 }));
    }

    #[test]
    fn pushs_pops_roundtrip_and_underflow() {
        let (result, out, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@x")]),
                i(Opcode::Pushs, vec![Operand::int("9")]),
                i(Opcode::Pops, vec![Operand::var("GF@x")]),
                i(Opcode::Write, vec![Operand::var("GF@x")]),
                i(Opcode::Pops, vec![Operand::var("GF@x")]),
            ],
            "",
        );
        assert_eq!(result, Err(RuntimeError::DataStackUnderflow { at: 4 }));
        assert_eq!(out, "9");
    }

    #[test]
    fn jumpifeq_nil_semantics() {
        // nil vs non-nil is unequal, not a type error.
        let (result, out, _) = run(
            vec![
                i(
                    Opcode::JumpIfEq,
                    vec![Operand::label("t"), Operand::nil(), Operand::int("1")],
                ),
                i(Opcode::Write, vec![Operand::string("ne")]),
                i(Opcode::Label, vec![Operand::label("t")]),
            ],
            "",
        );
        assert_eq!(result, Ok(0));
        assert_eq!(out, "ne");

        // nil vs nil is equal.
        let (result, out, _) = run(
            vec![
                i(
                    Opcode::JumpIfNeq,
                    vec![Operand::label("t"), Operand::nil(), Operand::nil()],
                ),
                i(Opcode::Write, vec![Operand::string("eq")]),
                i(Opcode::Label, vec![Operand::label("t")]),
            ],
            "",
        );
        assert_eq!(result, Ok(0));
        assert_eq!(out, "eq");
    }

    #[test]
    fn jumpifeq_mismatched_tags_error() {
        let (result, _, _) = run(
            vec![
                i(Opcode::Label, vec![Operand::label("t")]),
                i(
                    Opcode::JumpIfEq,
                    vec![
                        Operand::label("t"),
                        Operand::int("1"),
                        Operand::string("1"),
                    ],
                ),
            ],
            "",
        );
        assert_eq!(
            result,
            Err(RuntimeError::WrongOperandType {
                at: 1,
                found: "string"
            })
        );
    }

    #[test]
    fn exit_codes() {
        let (result, _, _) = run(vec![i(Opcode::Exit, vec![Operand::int("7")])], "");
        assert_eq!(result, Ok(7));

        let (result, _, _) = run(vec![i(Opcode::Exit, vec![Operand::int("10")])], "");
        assert_eq!(
            result,
            Err(RuntimeError::InvalidExitCode { at: 0, code: 10 })
        );

        let (result, _, _) = run(vec![i(Opcode::Exit, vec![Operand::int("-1")])], "");
        assert_eq!(
            result,
            Err(RuntimeError::InvalidExitCode { at: 0, code: -1 })
        );
    }

    #[test]
    fn read_parses_or_degrades_to_nil() {
        let (result, out, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@v")]),
                i(Opcode::Defvar, vec![Operand::var("GF@t")]),
                i(
                    Opcode::Read,
                    vec![Operand::var("GF@v"), Operand::type_name("int")],
                ),
                i(
                    Opcode::Type,
                    vec![Operand::var("GF@t"), Operand::var("GF@v")],
                ),
                i(Opcode::Write, vec![Operand::var("GF@t")]),
                // Input is now exhausted: the second READ yields nil.
                i(
                    Opcode::Read,
                    vec![Operand::var("GF@v"), Operand::type_name("int")],
                ),
                i(
                    Opcode::Type,
                    vec![Operand::var("GF@t"), Operand::var("GF@v")],
                ),
                i(Opcode::Write, vec![Operand::var("GF@t")]),
            ],
            "42\n",
        );
        assert_eq!(result, Ok(0));
        assert_eq!(out, "intnil");
    }

    #[test]
    fn read_rejects_unknown_type() {
        let (result, _, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@v")]),
                i(
                    Opcode::Read,
                    vec![Operand::var("GF@v"), Operand::type_name("float")],
                ),
            ],
            "1.0\n",
        );
        assert_eq!(
            result,
            Err(RuntimeError::InvalidReadType {
                at: 1,
                text: "float".into()
            })
        );
    }

    #[test]
    fn string_opcodes() {
        let (result, out, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@s")]),
                i(
                    Opcode::Concat,
                    vec![
                        Operand::var("GF@s"),
                        Operand::string("abc"),
                        Operand::string("def"),
                    ],
                ),
                i(Opcode::Defvar, vec![Operand::var("GF@n")]),
                i(
                    Opcode::Strlen,
                    vec![Operand::var("GF@n"), Operand::var("GF@s")],
                ),
                i(Opcode::Defvar, vec![Operand::var("GF@c")]),
                i(
                    Opcode::Getchar,
                    vec![
                        Operand::var("GF@c"),
                        Operand::var("GF@s"),
                        Operand::int("2"),
                    ],
                ),
                i(
                    Opcode::Setchar,
                    vec![
                        Operand::var("GF@s"),
                        Operand::int("0"),
                        Operand::string("X"),
                    ],
                ),
                i(Opcode::Write, vec![Operand::var("GF@s")]),
                i(Opcode::Write, vec![Operand::var("GF@n")]),
                i(Opcode::Write, vec![Operand::var("GF@c")]),
            ],
            "",
        );
        assert_eq!(result, Ok(0));
        assert_eq!(out, "Xbcdef6c");
    }

    #[test]
    fn getchar_at_length_is_out_of_range() {
        let (result, _, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@c")]),
                i(
                    Opcode::Getchar,
                    vec![
                        Operand::var("GF@c"),
                        Operand::string("abc"),
                        Operand::int("3"),
                    ],
                ),
            ],
            "",
        );
        assert_eq!(
            result,
            Err(RuntimeError::IndexOutOfRange {
                at: 1,
                index: 3,
                length: 3
            })
        );
    }

    #[test]
    fn setchar_empty_replacement() {
        let (result, _, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@s")]),
                i(
                    Opcode::Move,
                    vec![Operand::var("GF@s"), Operand::string("abc")],
                ),
                i(
                    Opcode::Setchar,
                    vec![
                        Operand::var("GF@s"),
                        Operand::int("0"),
                        Operand::string(""),
                    ],
                ),
            ],
            "",
        );
        assert_eq!(result, Err(RuntimeError::EmptyReplacement { at: 2 }));
    }

    #[test]
    fn int2char_and_stri2int() {
        let (result, out, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@c")]),
                i(
                    Opcode::Int2Char,
                    vec![Operand::var("GF@c"), Operand::int("65")],
                ),
                i(Opcode::Defvar, vec![Operand::var("GF@n")]),
                i(
                    Opcode::Stri2Int,
                    vec![
                        Operand::var("GF@n"),
                        Operand::string("abc"),
                        Operand::int("1"),
                    ],
                ),
                i(Opcode::Write, vec![Operand::var("GF@c")]),
                i(Opcode::Write, vec![Operand::var("GF@n")]),
            ],
            "",
        );
        assert_eq!(result, Ok(0));
        assert_eq!(out, "A98");
    }

    #[test]
    fn int2char_invalid_codepoint() {
        for bad in ["-1", "1114112", "55296"] {
            let (result, _, _) = run(
                vec![
                    i(Opcode::Defvar, vec![Operand::var("GF@c")]),
                    i(
                        Opcode::Int2Char,
                        vec![Operand::var("GF@c"), Operand::int(bad)],
                    ),
                ],
                "",
            );
            assert!(
                matches!(result, Err(RuntimeError::InvalidCodepoint { at: 1, .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn type_of_literals_and_unset_variable() {
        let (result, out, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@t")]),
                i(Opcode::Defvar, vec![Operand::var("GF@unset")]),
                i(
                    Opcode::Type,
                    vec![Operand::var("GF@t"), Operand::int("1")],
                ),
                i(Opcode::Write, vec![Operand::var("GF@t")]),
                i(Opcode::Write, vec![Operand::string("|")]),
                i(
                    Opcode::Type,
                    vec![Operand::var("GF@t"), Operand::var("GF@unset")],
                ),
                i(Opcode::Write, vec![Operand::var("GF@t")]),
                i(Opcode::Write, vec![Operand::string("|")]),
                i(
                    Opcode::Type,
                    vec![Operand::var("GF@t"), Operand::nil()],
                ),
                i(Opcode::Write, vec![Operand::var("GF@t")]),
            ],
            "",
        );
        assert_eq!(result, Ok(0));
        assert_eq!(out, "int||nil");
    }

    #[test]
    fn boolean_family_is_not_implemented() {
        for op in [
            Opcode::Lt,
            Opcode::Gt,
            Opcode::Eq,
            Opcode::And,
            Opcode::Or,
        ] {
            let (result, _, _) = run(
                vec![
                    i(Opcode::Defvar, vec![Operand::var("GF@r")]),
                    i(
                        op,
                        vec![
                            Operand::var("GF@r"),
                            Operand::bool_lit("true"),
                            Operand::bool_lit("false"),
                        ],
                    ),
                ],
                "",
            );
            assert_eq!(
                result,
                Err(RuntimeError::NotImplemented {
                    at: 1,
                    opcode: op.mnemonic()
                })
            );
        }
        let (result, _, _) = run(
            vec![
                i(Opcode::Defvar, vec![Operand::var("GF@r")]),
                i(
                    Opcode::Not,
                    vec![Operand::var("GF@r"), Operand::bool_lit("true")],
                ),
            ],
            "",
        );
        assert_eq!(
            result,
            Err(RuntimeError::NotImplemented {
                at: 1,
                opcode: "NOT"
            })
        );
    }

    #[test]
    fn dprint_and_break_go_to_diagnostics() {
        let (result, out, err) = run(
            vec![
                i(Opcode::Pushs, vec![Operand::int("3")]),
                i(Opcode::Dprint, vec![Operand::nil()]),
                i(Opcode::Break, vec![]),
            ],
            "",
        );
        assert_eq!(result, Ok(0));
        assert_eq!(out, "");
        assert!(err.starts_with("nil\n"));
        assert!(err.contains("instruction pointer: 2"));
        assert!(err.contains("global frame:"));
        assert!(err.contains("data stack (1):"));
        assert!(err.contains("int@3"));
        assert!(err.contains("call stack (0):"));
    }

    #[test]
    fn jump_to_undefined_label() {
        let (result, _, _) = run(vec![i(Opcode::Jump, vec![Operand::label("nowhere")])], "");
        assert_eq!(
            result,
            Err(RuntimeError::UndefinedLabel {
                name: "nowhere".into()
            })
        );
    }

    #[test]
    fn malformed_literal_fails_only_when_resolved() {
        // The bad literal sits behind a jump and is never executed.
        let (result, _, _) = run(
            vec![
                i(Opcode::Jump, vec![Operand::label("end")]),
                i(Opcode::Write, vec![Operand::int("zzz")]),
                i(Opcode::Label, vec![Operand::label("end")]),
            ],
            "",
        );
        assert_eq!(result, Ok(0));

        let (result, _, _) = run(vec![i(Opcode::Write, vec![Operand::int("zzz")])], "");
        assert_eq!(
            result,
            Err(RuntimeError::InvalidLiteral {
                at: 0,
                text: "zzz".into()
            })
        );
    }
}
