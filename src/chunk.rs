//! Bytecode container: an append-only instruction stream, a parallel line
//! table and a constant pool.
//!
//! Every instruction is one opcode byte, optionally followed by a single
//! operand byte (constant index, local slot or global-name constant).

use bytes::{BufMut, BytesMut};
use log::{debug, warn};
use serde::Serialize;

use crate::value::Value;

/// Largest number of constants addressable by a one-byte operand.
pub const CONSTANTS_MAX: usize = u8::MAX as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum OpCode {
    Constant,
    Nil,
    True,
    False,
    Pop,
    GetLocal,
    SetLocal,
    GetGlobal,
    DefineGlobal,
    SetGlobal,
    Equal,
    Greater,
    Less,
    Add,
    Subtract,
    Multiply,
    Divide,
    Not,
    Negate,
    Print,
    Return,
}

impl OpCode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_width(self) -> usize {
        match self {
            OpCode::Constant
            | OpCode::GetLocal
            | OpCode::SetLocal
            | OpCode::GetGlobal
            | OpCode::DefineGlobal
            | OpCode::SetGlobal => 1,
            _ => 0,
        }
    }

    /// Mnemonic used by the disassembler.
    pub const fn name(self) -> &'static str {
        match self {
            OpCode::Constant => "OP_CONSTANT",
            OpCode::Nil => "OP_NIL",
            OpCode::True => "OP_TRUE",
            OpCode::False => "OP_FALSE",
            OpCode::Pop => "OP_POP",
            OpCode::GetLocal => "OP_GET_LOCAL",
            OpCode::SetLocal => "OP_SET_LOCAL",
            OpCode::GetGlobal => "OP_GET_GLOBAL",
            OpCode::DefineGlobal => "OP_DEFINE_GLOBAL",
            OpCode::SetGlobal => "OP_SET_GLOBAL",
            OpCode::Equal => "OP_EQUAL",
            OpCode::Greater => "OP_GREATER",
            OpCode::Less => "OP_LESS",
            OpCode::Add => "OP_ADD",
            OpCode::Subtract => "OP_SUBTRACT",
            OpCode::Multiply => "OP_MULTIPLY",
            OpCode::Divide => "OP_DIVIDE",
            OpCode::Not => "OP_NOT",
            OpCode::Negate => "OP_NEGATE",
            OpCode::Print => "OP_PRINT",
            OpCode::Return => "OP_RETURN",
        }
    }
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        const TABLE: [OpCode; 21] = [
            OpCode::Constant,
            OpCode::Nil,
            OpCode::True,
            OpCode::False,
            OpCode::Pop,
            OpCode::GetLocal,
            OpCode::SetLocal,
            OpCode::GetGlobal,
            OpCode::DefineGlobal,
            OpCode::SetGlobal,
            OpCode::Equal,
            OpCode::Greater,
            OpCode::Less,
            OpCode::Add,
            OpCode::Subtract,
            OpCode::Multiply,
            OpCode::Divide,
            OpCode::Not,
            OpCode::Negate,
            OpCode::Print,
            OpCode::Return,
        ];

        TABLE.get(byte as usize).copied().ok_or(byte)
    }
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub offset: usize,
    pub line: usize,
    pub op: OpCode,
    pub operand: Option<u8>,
}

#[derive(Debug, Default)]
pub struct Chunk {
    code: BytesMut,
    lines: Vec<usize>,
    constants: Vec<Value>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operand-less instruction; returns its offset.
    pub fn write(&mut self, op: OpCode, line: usize) -> usize {
        debug_assert_eq!(op.operand_width(), 0, "{} takes an operand", op.name());

        self.push_byte(op as u8, line)
    }

    /// Append an instruction with its one-byte operand; returns the
    /// instruction's offset.
    pub fn write_with_operand(&mut self, op: OpCode, operand: u8, line: usize) -> usize {
        debug_assert_eq!(op.operand_width(), 1, "{} takes no operand", op.name());

        let offset = self.push_byte(op as u8, line);
        self.push_byte(operand, line);

        offset
    }

    /// Append `value` to the constant pool and return its index.  The index
    /// is not range-checked here; callers decide what fits their operand.
    pub fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);

        debug!("Constant #{} added: {:?}", self.constants.len() - 1, value);

        self.constants.len() - 1
    }

    fn push_byte(&mut self, byte: u8, line: usize) -> usize {
        let offset = self.code.len();
        self.code.put_u8(byte);
        self.lines.push(line);
        offset
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn constants(&self) -> &[Value] {
        &self.constants
    }

    pub fn constant(&self, index: u8) -> Option<&Value> {
        self.constants.get(index as usize)
    }

    pub fn line_at(&self, offset: usize) -> Option<usize> {
        self.lines.get(offset).copied()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Decode the instruction stream.
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions {
            chunk: self,
            offset: 0,
        }
    }

    /// Just the opcodes, in order.
    pub fn opcodes(&self) -> Vec<OpCode> {
        self.instructions().map(|i| i.op).collect()
    }
}

pub struct Instructions<'c> {
    chunk: &'c Chunk,
    offset: usize,
}

impl Iterator for Instructions<'_> {
    type Item = Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        let code = self.chunk.code();
        let byte = *code.get(self.offset)?;

        let op = match OpCode::try_from(byte) {
            Ok(op) => op,
            Err(byte) => {
                warn!("Unknown opcode {} at offset {}", byte, self.offset);
                self.offset = code.len();
                return None;
            }
        };

        let operand = match op.operand_width() {
            0 => None,
            _ => match code.get(self.offset + 1) {
                Some(&b) => Some(b),
                None => {
                    warn!("{} at offset {} is missing its operand", op.name(), self.offset);
                    self.offset = code.len();
                    return None;
                }
            },
        };

        let instruction = Instruction {
            offset: self.offset,
            line: self.chunk.lines[self.offset],
            op,
            operand,
        };

        self.offset += 1 + op.operand_width();

        Some(instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_byte_round_trip_covers_every_opcode() {
        for byte in 0..=u8::MAX {
            if let Ok(op) = OpCode::try_from(byte) {
                assert_eq!(op as u8, byte);
            }
        }

        assert_eq!(OpCode::try_from(OpCode::Return as u8), Ok(OpCode::Return));
        assert_eq!(OpCode::try_from(OpCode::Return as u8 + 1), Err(21));
    }

    #[test]
    fn test_write_returns_offsets_and_tracks_lines() {
        let mut chunk = Chunk::new();
        let idx = chunk.add_constant(Value::Number(1.5));

        assert_eq!(chunk.write_with_operand(OpCode::Constant, idx as u8, 1), 0);
        assert_eq!(chunk.write(OpCode::Negate, 2), 2);
        assert_eq!(chunk.write(OpCode::Return, 2), 3);

        assert_eq!(chunk.len(), 4);
        assert_eq!(chunk.line_at(0), Some(1));
        assert_eq!(chunk.line_at(1), Some(1));
        assert_eq!(chunk.line_at(2), Some(2));
        assert_eq!(chunk.constant(0), Some(&Value::Number(1.5)));
    }

    #[test]
    fn test_instructions_decode_operands() {
        let mut chunk = Chunk::new();
        chunk.write(OpCode::Nil, 1);
        chunk.write_with_operand(OpCode::GetLocal, 3, 1);
        chunk.write(OpCode::Add, 1);

        let decoded: Vec<Instruction> = chunk.instructions().collect();

        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].operand, None);
        assert_eq!(decoded[1].op, OpCode::GetLocal);
        assert_eq!(decoded[1].operand, Some(3));
        assert_eq!(decoded[2].offset, 3);
    }

    #[test]
    fn test_constant_indices_are_not_truncated() {
        let mut chunk = Chunk::new();

        for i in 0..300 {
            assert_eq!(chunk.add_constant(Value::Number(i as f64)), i);
        }

        assert_eq!(chunk.constants().len(), 300);
    }
}
