//! Instruction encoder
//!
//! The inverse of [`decode_instruction`](crate::decode_instruction): turns an
//! opcode and already-resolved operands into the exact bytes the machine
//! fetches. There is no text parsing here; program loaders build operand lists
//! and call [`encode`].

use crate::opcodes::Opcode;
use crate::operands::{Operand, OperandType};
use thiserror::Error;

/// Errors produced while encoding an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The operand count does not match the opcode's signature.
    #[error("{mnemonic} takes {expected} operands, got {found}")]
    ArityMismatch {
        mnemonic: &'static str,
        expected: usize,
        found: usize,
    },

    /// An operand cannot fill its signature slot.
    #[error("{mnemonic} operand {slot} must be {expected}")]
    TypeMismatch {
        mnemonic: &'static str,
        slot: usize,
        expected: OperandType,
    },

    /// An immediate does not fit its encoded width.
    #[error("{mnemonic} operand {slot}: {value} does not fit in {ty}")]
    ImmediateOutOfRange {
        mnemonic: &'static str,
        slot: usize,
        value: i64,
        ty: OperandType,
    },
}

/// Accepted immediate range per tag.
///
/// Both the signed and unsigned readings of the field are accepted, so
/// `Int8` takes `-128..=255`; the value is stored as its low bytes.
fn immediate_range(ty: OperandType) -> Option<(i64, i64)> {
    match ty {
        OperandType::Int8 => Some((i8::MIN as i64, u8::MAX as i64)),
        OperandType::Int16 => Some((i16::MIN as i64, u16::MAX as i64)),
        OperandType::Int32 => Some((i32::MIN as i64, u32::MAX as i64)),
        _ => None,
    }
}

/// Appends the encoding of `operand` as type `ty`.
///
/// The caller has already checked that the operand fits the slot.
pub(crate) fn push_operand(bytes: &mut Vec<u8>, operand: Operand, ty: OperandType) {
    match (operand, ty) {
        (Operand::Register(r), _) => bytes.push(r),
        (Operand::Address(a), _) => bytes.extend_from_slice(&a.to_le_bytes()),
        (Operand::Size(w), _) => bytes.push(w as u8),
        (Operand::Offset(o), _) => bytes.extend_from_slice(&o.to_le_bytes()),
        (Operand::Comparison(p), _) => bytes.push(p as u8),
        (Operand::Immediate(v), OperandType::Int8) => bytes.push(v as u8),
        (Operand::Immediate(v), OperandType::Int16) => {
            bytes.extend_from_slice(&(v as u16).to_le_bytes())
        }
        (Operand::Immediate(v), _) => bytes.extend_from_slice(&(v as u32).to_le_bytes()),
    }
}

/// Encodes one instruction.
///
/// # Examples
///
/// ```
/// use bytevm::{encode, Opcode, Operand, Predicate};
///
/// let bytes = encode(
///     Opcode::Br,
///     &[Operand::Comparison(Predicate::Eq), Operand::Offset(-4)],
/// )
/// .unwrap();
/// assert_eq!(bytes, vec![0x36, 0x02, 0xFC, 0xFF]);
/// ```
pub fn encode(opcode: Opcode, operands: &[Operand]) -> Result<Vec<u8>, EncodeError> {
    let metadata = opcode.metadata();

    if operands.len() != metadata.operands.len() {
        return Err(EncodeError::ArityMismatch {
            mnemonic: metadata.mnemonic,
            expected: metadata.operands.len(),
            found: operands.len(),
        });
    }

    let mut bytes = Vec::with_capacity(metadata.size_bytes());
    bytes.push(opcode as u8);

    for (slot, (&operand, &ty)) in operands.iter().zip(metadata.operands).enumerate() {
        if !operand.fits(ty) {
            return Err(EncodeError::TypeMismatch {
                mnemonic: metadata.mnemonic,
                slot,
                expected: ty,
            });
        }
        if let (Operand::Immediate(value), Some((min, max))) = (operand, immediate_range(ty)) {
            if value < min || value > max {
                return Err(EncodeError::ImmediateOutOfRange {
                    mnemonic: metadata.mnemonic,
                    slot,
                    value,
                    ty,
                });
            }
        }
        push_operand(&mut bytes, operand, ty);
    }

    Ok(bytes)
}
