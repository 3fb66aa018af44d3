//! # Operand Decoder
//!
//! Turns raw instruction bytes into an [`Instruction`] by walking the opcode's
//! operand signature. Decoding is pure: it never touches machine state.
//!
//! ## Encoding
//!
//! `[opcode: 1 byte][operand_1]...[operand_k]`, each operand as wide as its
//! type tag (see [`OperandType::encoded_width`]), multi-byte fields
//! little-endian.

use crate::memory::Width;
use crate::opcodes::{lookup, Opcode};
use crate::operands::{Operand, OperandType, Predicate};
use crate::ExecutionError;
use std::fmt;

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Memory address of the opcode byte
    pub address: u16,

    /// The decoded opcode
    pub opcode: Opcode,

    /// Resolved operands, one per signature slot
    pub operands: Vec<Operand>,

    /// Total encoded size in bytes (opcode + operands)
    pub size_bytes: usize,
}

impl Instruction {
    /// Address of the instruction that follows this one.
    ///
    /// May equal the end of memory; fetching from there faults.
    pub fn next_address(&self) -> u32 {
        self.address as u32 + self.size_bytes as u32
    }

    fn mismatch(&self, slot: usize) -> ExecutionError {
        ExecutionError::OperandMismatch {
            opcode: self.opcode as u8,
            slot,
        }
    }

    /// Register index in operand `slot`.
    pub fn register(&self, slot: usize) -> Result<u8, ExecutionError> {
        match self.operands.get(slot) {
            Some(Operand::Register(r)) => Ok(*r),
            _ => Err(self.mismatch(slot)),
        }
    }

    /// Absolute address in operand `slot`.
    pub fn address_operand(&self, slot: usize) -> Result<u16, ExecutionError> {
        match self.operands.get(slot) {
            Some(Operand::Address(a)) => Ok(*a),
            _ => Err(self.mismatch(slot)),
        }
    }

    /// Width in operand `slot`.
    pub fn size(&self, slot: usize) -> Result<Width, ExecutionError> {
        match self.operands.get(slot) {
            Some(Operand::Size(w)) => Ok(*w),
            _ => Err(self.mismatch(slot)),
        }
    }

    /// Relative offset in operand `slot`.
    pub fn offset(&self, slot: usize) -> Result<i16, ExecutionError> {
        match self.operands.get(slot) {
            Some(Operand::Offset(o)) => Ok(*o),
            _ => Err(self.mismatch(slot)),
        }
    }

    /// Predicate in operand `slot`.
    pub fn predicate(&self, slot: usize) -> Result<Predicate, ExecutionError> {
        match self.operands.get(slot) {
            Some(Operand::Comparison(p)) => Ok(*p),
            _ => Err(self.mismatch(slot)),
        }
    }

    /// Sign-extended immediate in operand `slot`.
    pub fn immediate(&self, slot: usize) -> Result<i64, ExecutionError> {
        match self.operands.get(slot) {
            Some(Operand::Immediate(v)) => Ok(*v),
            _ => Err(self.mismatch(slot)),
        }
    }

    /// Re-encodes this instruction into bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size_bytes);
        bytes.push(self.opcode as u8);
        for (operand, ty) in self.operands.iter().zip(self.opcode.metadata().operands) {
            crate::encoder::push_operand(&mut bytes, *operand, *ty);
        }
        bytes
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::disassembler::format_instruction(self))
    }
}

/// Decodes one operand of type `ty` from the front of `bytes`.
///
/// `bytes` must hold at least `ty.encoded_width()` bytes.
fn decode_operand(ty: OperandType, bytes: &[u8]) -> Result<Operand, ExecutionError> {
    let le16 = || u16::from_le_bytes([bytes[0], bytes[1]]);

    Ok(match ty {
        OperandType::Register => Operand::Register(bytes[0]),
        OperandType::Address => Operand::Address(le16()),
        OperandType::Size => Operand::Size(
            Width::from_byte(bytes[0]).ok_or(ExecutionError::InvalidSize(bytes[0]))?,
        ),
        OperandType::Offset => Operand::Offset(le16() as i16),
        OperandType::Comparison => Operand::Comparison(
            Predicate::from_byte(bytes[0]).ok_or(ExecutionError::InvalidComparison(bytes[0]))?,
        ),
        OperandType::Int8 => Operand::Immediate(bytes[0] as i8 as i64),
        OperandType::Int16 => Operand::Immediate(le16() as i16 as i64),
        OperandType::Int32 => Operand::Immediate(
            i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64,
        ),
    })
}

/// Decodes a single instruction from a byte slice.
///
/// # Arguments
///
/// * `bytes` - Bytes starting at the opcode; anything past the instruction is ignored
/// * `address` - Memory address of the opcode byte
///
/// # Errors
///
/// - [`ExecutionError::UnknownOpcode`] if the first byte is not in the opcode table
/// - [`ExecutionError::TruncatedInstruction`] if `bytes` ends before the signature does
/// - [`ExecutionError::InvalidSize`] / [`ExecutionError::InvalidComparison`] for
///   operand bytes outside their encoding
///
/// # Examples
///
/// ```
/// use bytevm::{decode_instruction, Opcode, Operand};
///
/// // ADD R1, R2
/// let instr = decode_instruction(&[0x0E, 0x01, 0x02], 0x0040).unwrap();
/// assert_eq!(instr.opcode, Opcode::Add);
/// assert_eq!(instr.operands, vec![Operand::Register(1), Operand::Register(2)]);
/// assert_eq!(instr.size_bytes, 3);
/// ```
pub fn decode_instruction(bytes: &[u8], address: u16) -> Result<Instruction, ExecutionError> {
    let (&opcode_byte, rest) = bytes.split_first().ok_or(ExecutionError::TruncatedInstruction {
        opcode: None,
        needed: 1,
        available: 0,
    })?;
    let metadata = lookup(opcode_byte)?;

    if bytes.len() < metadata.size_bytes() {
        return Err(ExecutionError::TruncatedInstruction {
            opcode: Some(opcode_byte),
            needed: metadata.size_bytes(),
            available: bytes.len(),
        });
    }

    let mut operands = Vec::with_capacity(metadata.operands.len());
    let mut cursor = 0;
    for &ty in metadata.operands {
        let width = ty.encoded_width();
        operands.push(decode_operand(ty, &rest[cursor..cursor + width])?);
        cursor += width;
    }

    Ok(Instruction {
        address,
        opcode: metadata.opcode,
        operands,
        size_bytes: 1 + cursor,
    })
}
