//! VM state management: frames, call stack, data stack, label table.

use std::collections::HashMap;

use ippvm_common::{Instruction, Opcode, Operand, OperandKind, Program, Value};

use crate::error::RuntimeError;
use crate::frames::{Frames, VariableAddress};
use crate::io::{Input, Output};

/// The IPPcode virtual machine.
///
/// All mutable state is exclusively owned here for the duration of one
/// run; nothing survives across runs.
pub struct Vm<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Label name → instruction index, built before execution begins.
    pub(crate) labels: HashMap<String, usize>,
    /// Instruction pointer.
    pub(crate) ip: usize,
    /// Return addresses, manipulated only by CALL/RETURN.
    pub(crate) call_stack: Vec<usize>,
    /// General-purpose value stack, manipulated only by PUSHS/POPS.
    pub(crate) data_stack: Vec<Value>,
    /// Variable scopes.
    pub(crate) frames: Frames,
    /// Source of values for READ.
    pub(crate) input: &'a mut dyn Input,
    /// Primary results sink.
    pub(crate) stdout: &'a mut dyn Output,
    /// Diagnostics sink.
    pub(crate) stderr: &'a mut dyn Output,
}

impl<'a> Vm<'a> {
    /// Create a new VM for the given program and capabilities.
    pub fn new(
        program: &'a Program,
        input: &'a mut dyn Input,
        stdout: &'a mut dyn Output,
        stderr: &'a mut dyn Output,
    ) -> Self {
        Self {
            program,
            labels: HashMap::new(),
            ip: 0,
            call_stack: Vec::new(),
            data_stack: Vec::new(),
            frames: Frames::new(),
            input,
            stdout,
            stderr,
        }
    }

    /// Parse a var operand into an address.
    pub(crate) fn var_addr(&self, operand: &Operand) -> Result<VariableAddress, RuntimeError> {
        if operand.kind != OperandKind::Var {
            return Err(RuntimeError::WrongOperandType {
                at: self.ip,
                found: operand.kind.name(),
            });
        }
        VariableAddress::parse(&operand.text)
    }

    /// Resolve a label operand to an instruction index.
    ///
    /// Resolution is deliberately lazy: the table was built by a full
    /// pre-pass, so forward references work, and only genuinely
    /// undefined labels fail here at first use.
    pub(crate) fn label_target(&self, operand: &Operand) -> Result<usize, RuntimeError> {
        if operand.kind != OperandKind::Label {
            return Err(RuntimeError::WrongOperandType {
                at: self.ip,
                found: operand.kind.name(),
            });
        }
        self.labels
            .get(&operand.text)
            .copied()
            .ok_or_else(|| RuntimeError::UndefinedLabel {
                name: operand.text.clone(),
            })
    }

    /// Pop the data stack.
    pub(crate) fn pop_data(&mut self) -> Result<Value, RuntimeError> {
        self.data_stack
            .pop()
            .ok_or(RuntimeError::DataStackUnderflow { at: self.ip })
    }

    /// Pop the call stack.
    pub(crate) fn pop_call(&mut self) -> Result<usize, RuntimeError> {
        self.call_stack
            .pop()
            .ok_or(RuntimeError::CallStackUnderflow { at: self.ip })
    }
}

/// Check every instruction's operand count against its opcode signature.
pub(crate) fn check_operand_counts(program: &Program) -> Result<(), RuntimeError> {
    for (at, instr) in program.instructions.iter().enumerate() {
        let expected = instr.opcode.arity();
        let found = instr.operands.len();
        if expected != found {
            return Err(RuntimeError::BadOperandCount {
                at,
                opcode: instr.opcode.mnemonic(),
                expected,
                found,
            });
        }
    }
    Ok(())
}

/// Build the label table by a single forward scan, rejecting duplicates.
pub(crate) fn build_label_table(
    program: &Program,
) -> Result<HashMap<String, usize>, RuntimeError> {
    let mut labels = HashMap::new();
    for (index, instr) in program.instructions.iter().enumerate() {
        if instr.opcode != Opcode::Label {
            continue;
        }
        let name = match instr.operands.first() {
            Some(operand) => operand.text.clone(),
            None => continue, // rejected by the operand-count pass
        };
        if labels.insert(name.clone(), index).is_some() {
            return Err(RuntimeError::DuplicateLabel { name });
        }
    }
    Ok(labels)
}

/// Fetch helper used by the dispatch loop.
pub(crate) fn instruction_at(program: &Program, ip: usize) -> Option<&Instruction> {
    program.instructions.get(ip)
}
