//! # Opcode Metadata Table
//!
//! This module contains the opcode metadata table that serves as the single
//! source of truth for every instruction: its mnemonic and its ordered operand
//! signature. Encoded instruction sizes are derived from the signature, never
//! stored separately.
//!
//! The table covers 62 opcodes, `0x00..=0x3D`, grouped as:
//! - **control**: HLT, NOP, JMP, JMPA, BR, BRA, CALL, CALLA, RET
//! - **transfer**: MOVI8, MOVI16, MOVI32, MOV, SWAP, CLR, MOVLANE
//! - **load/store**: LOAD, LOADS, STORE, STI8, LOADR, STORER
//! - **alu**: ADD, SUB, MUL, DIV, MOD, DIVU, MODU, ADDI, ADDIW, MULI, INC, DEC, NEG
//! - **bitwise**: AND, OR, XOR, NOT, ANDI, ORI, SHL, SHR, SAR, SHLI, SHRI, SEXT, ZEXT
//! - **float**: FADD, FSUB, FMUL, FDIV, ITOF, FTOI, FNARROW, FWIDEN
//! - **compare**: CMP, CMPU, FCMP, CMPI
//! - **stack**: PUSH, POP

use crate::operands::OperandType;
use crate::ExecutionError;

/// Every opcode of the instruction set.
///
/// The discriminant is the encoded opcode byte and the index of the opcode's
/// entry in [`OPCODE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Hlt = 0x00,
    Nop = 0x01,
    MovI8 = 0x02,
    MovI16 = 0x03,
    MovI32 = 0x04,
    Mov = 0x05,
    Swap = 0x06,
    Clr = 0x07,
    Load = 0x08,
    LoadS = 0x09,
    Store = 0x0A,
    Sti8 = 0x0B,
    LoadR = 0x0C,
    StoreR = 0x0D,
    Add = 0x0E,
    Sub = 0x0F,
    Mul = 0x10,
    Div = 0x11,
    Mod = 0x12,
    DivU = 0x13,
    ModU = 0x14,
    AddI = 0x15,
    AddIW = 0x16,
    MulI = 0x17,
    Inc = 0x18,
    Dec = 0x19,
    Neg = 0x1A,
    And = 0x1B,
    Or = 0x1C,
    Xor = 0x1D,
    Not = 0x1E,
    AndI = 0x1F,
    OrI = 0x20,
    Shl = 0x21,
    Shr = 0x22,
    Sar = 0x23,
    ShlI = 0x24,
    ShrI = 0x25,
    Sext = 0x26,
    Zext = 0x27,
    FAdd = 0x28,
    FSub = 0x29,
    FMul = 0x2A,
    FDiv = 0x2B,
    IToF = 0x2C,
    FToI = 0x2D,
    FNarrow = 0x2E,
    FWiden = 0x2F,
    Cmp = 0x30,
    CmpU = 0x31,
    FCmp = 0x32,
    CmpI = 0x33,
    Jmp = 0x34,
    JmpA = 0x35,
    Br = 0x36,
    BrA = 0x37,
    Call = 0x38,
    CallA = 0x39,
    Ret = 0x3A,
    Push = 0x3B,
    Pop = 0x3C,
    MovLane = 0x3D,
}

impl Opcode {
    /// Looks up the opcode for an encoded byte.
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        OPCODE_TABLE.get(byte as usize).map(|m| m.opcode)
    }

    /// This opcode's table entry.
    pub fn metadata(self) -> &'static OpcodeMetadata {
        &OPCODE_TABLE[self as usize]
    }

    /// Instruction mnemonic.
    pub fn mnemonic(self) -> &'static str {
        self.metadata().mnemonic
    }
}

/// Metadata for a single opcode.
///
/// # Fields
///
/// - `opcode`: The opcode this entry describes
/// - `mnemonic`: Instruction name (e.g., "ADD", "LOAD")
/// - `operands`: Ordered operand types; empty for opcodes without operands
///
/// # Examples
///
/// ```
/// use bytevm::{OperandType, OPCODE_TABLE};
///
/// let load = &OPCODE_TABLE[0x08];
/// assert_eq!(load.mnemonic, "LOAD");
/// assert_eq!(
///     load.operands,
///     &[OperandType::Register, OperandType::Size, OperandType::Address]
/// );
/// assert_eq!(load.size_bytes(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// The opcode this entry describes.
    pub opcode: Opcode,

    /// Instruction mnemonic.
    pub mnemonic: &'static str,

    /// Operand signature, in encoding order.
    pub operands: &'static [OperandType],
}

impl OpcodeMetadata {
    /// Total encoded size: one opcode byte plus every operand's width.
    pub const fn size_bytes(&self) -> usize {
        let mut size = 1;
        let mut i = 0;
        while i < self.operands.len() {
            size += self.operands[i].encoded_width();
            i += 1;
        }
        size
    }
}

/// Looks up the metadata for an opcode byte.
///
/// # Errors
///
/// [`ExecutionError::UnknownOpcode`] if the byte has no table entry.
///
/// # Examples
///
/// ```
/// use bytevm::{lookup, ExecutionError};
///
/// assert_eq!(lookup(0x00).unwrap().mnemonic, "HLT");
/// assert_eq!(lookup(0xFF), Err(ExecutionError::UnknownOpcode(0xFF)));
/// ```
pub fn lookup(byte: u8) -> Result<&'static OpcodeMetadata, ExecutionError> {
    OPCODE_TABLE
        .get(byte as usize)
        .ok_or(ExecutionError::UnknownOpcode(byte))
}

use OperandType::{Address, Comparison, Int16, Int32, Int8, Offset, Register, Size};

const NONE: &[OperandType] = &[];
const R: &[OperandType] = &[Register];
const RR: &[OperandType] = &[Register, Register];

/// Number of defined opcodes. Bytes `OPCODE_COUNT..=0xFF` are unknown.
pub const OPCODE_COUNT: usize = 62;

macro_rules! entry {
    ($opcode:ident, $mnemonic:literal, $operands:expr) => {
        OpcodeMetadata {
            opcode: Opcode::$opcode,
            mnemonic: $mnemonic,
            operands: $operands,
        }
    };
}

/// Opcode metadata table indexed by opcode byte.
pub static OPCODE_TABLE: [OpcodeMetadata; OPCODE_COUNT] = [
    // 0x00
    entry!(Hlt, "HLT", NONE),
    entry!(Nop, "NOP", NONE),
    entry!(MovI8, "MOVI8", &[Register, Int8]),
    entry!(MovI16, "MOVI16", &[Register, Int16]),
    entry!(MovI32, "MOVI32", &[Register, Int32]),
    entry!(Mov, "MOV", RR),
    entry!(Swap, "SWAP", RR),
    entry!(Clr, "CLR", R),
    // 0x08
    entry!(Load, "LOAD", &[Register, Size, Address]),
    entry!(LoadS, "LOADS", &[Register, Size, Address]),
    entry!(Store, "STORE", &[Size, Address, Register]),
    entry!(Sti8, "STI8", &[Address, Int8]),
    entry!(LoadR, "LOADR", &[Register, Size, Register]),
    entry!(StoreR, "STORER", &[Size, Register, Register]),
    entry!(Add, "ADD", RR),
    entry!(Sub, "SUB", RR),
    // 0x10
    entry!(Mul, "MUL", RR),
    entry!(Div, "DIV", RR),
    entry!(Mod, "MOD", RR),
    entry!(DivU, "DIVU", RR),
    entry!(ModU, "MODU", RR),
    entry!(AddI, "ADDI", &[Register, Int8]),
    entry!(AddIW, "ADDIW", &[Register, Int16]),
    entry!(MulI, "MULI", &[Register, Int16]),
    // 0x18
    entry!(Inc, "INC", R),
    entry!(Dec, "DEC", R),
    entry!(Neg, "NEG", R),
    entry!(And, "AND", RR),
    entry!(Or, "OR", RR),
    entry!(Xor, "XOR", RR),
    entry!(Not, "NOT", R),
    entry!(AndI, "ANDI", &[Register, Int16]),
    // 0x20
    entry!(OrI, "ORI", &[Register, Int16]),
    entry!(Shl, "SHL", RR),
    entry!(Shr, "SHR", RR),
    entry!(Sar, "SAR", RR),
    entry!(ShlI, "SHLI", &[Register, Int8]),
    entry!(ShrI, "SHRI", &[Register, Int8]),
    entry!(Sext, "SEXT", &[Register, Size]),
    entry!(Zext, "ZEXT", &[Register, Size]),
    // 0x28
    entry!(FAdd, "FADD", RR),
    entry!(FSub, "FSUB", RR),
    entry!(FMul, "FMUL", RR),
    entry!(FDiv, "FDIV", RR),
    entry!(IToF, "ITOF", RR),
    entry!(FToI, "FTOI", RR),
    entry!(FNarrow, "FNARROW", R),
    entry!(FWiden, "FWIDEN", R),
    // 0x30
    entry!(Cmp, "CMP", RR),
    entry!(CmpU, "CMPU", RR),
    entry!(FCmp, "FCMP", RR),
    entry!(CmpI, "CMPI", &[Register, Int32]),
    entry!(Jmp, "JMP", &[Offset]),
    entry!(JmpA, "JMPA", &[Address]),
    entry!(Br, "BR", &[Comparison, Offset]),
    entry!(BrA, "BRA", &[Comparison, Address]),
    // 0x38
    entry!(Call, "CALL", &[Offset]),
    entry!(CallA, "CALLA", &[Address]),
    entry!(Ret, "RET", NONE),
    entry!(Push, "PUSH", R),
    entry!(Pop, "POP", R),
    entry!(MovLane, "MOVLANE", &[Register, Int8, Int16]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_index_matches_opcode_byte() {
        for (i, metadata) in OPCODE_TABLE.iter().enumerate() {
            assert_eq!(
                metadata.opcode as usize, i,
                "{} is stored at index 0x{:02X}",
                metadata.mnemonic, i
            );
        }
    }

    #[test]
    fn test_mnemonics_are_unique() {
        let names: HashSet<_> = OPCODE_TABLE.iter().map(|m| m.mnemonic).collect();
        assert_eq!(names.len(), OPCODE_COUNT);
    }

    #[test]
    fn test_unknown_bytes() {
        for byte in OPCODE_COUNT..=0xFF {
            assert_eq!(
                lookup(byte as u8),
                Err(ExecutionError::UnknownOpcode(byte as u8))
            );
            assert_eq!(Opcode::from_byte(byte as u8), None);
        }
    }

    #[test]
    fn test_sizes_derived_from_signature() {
        assert_eq!(Opcode::Hlt.metadata().size_bytes(), 1);
        assert_eq!(Opcode::Add.metadata().size_bytes(), 3);
        assert_eq!(Opcode::MovI32.metadata().size_bytes(), 6);
        assert_eq!(Opcode::Br.metadata().size_bytes(), 4);
        assert_eq!(Opcode::Store.metadata().size_bytes(), 5);
    }
}
