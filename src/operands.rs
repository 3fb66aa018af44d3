//! # Operand Types
//!
//! This module defines the operand type tags that make up an opcode's
//! signature, the encoded width of each tag, and the resolved operand values
//! the decoder produces.
//!
//! # Encoded Widths
//!
//! - **1 byte**: Register, Size, Comparison, Int8
//! - **2 bytes**: Address, Offset, Int16
//! - **4 bytes**: Int32
//!
//! An opcode without operands has an empty signature; there is no "null"
//! operand type to interleave with real ones.

use crate::memory::Width;
use crate::registers::CompareResult;
use std::fmt;

/// Operand type tag, one per slot of an opcode signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandType {
    /// Register index.
    ///
    /// Example: `ADD R1, R2`
    Register,

    /// Absolute memory address (u16, little-endian).
    ///
    /// Example: `LOAD R0, 4, $0100`
    Address,

    /// Byte width selector: 1, 2, 4 or 8.
    ///
    /// Example: `STORE 2, $0010, R3`
    Size,

    /// Signed displacement (i16, little-endian) relative to the next instruction.
    ///
    /// Example: `BR EQ, -12`
    Offset,

    /// Predicate tested against the flags register.
    ///
    /// Example: `BR NE, +4`
    Comparison,

    /// 8-bit immediate, sign-extended when decoded.
    Int8,

    /// 16-bit immediate, sign-extended when decoded.
    Int16,

    /// 32-bit immediate, sign-extended when decoded.
    Int32,
}

impl OperandType {
    /// Number of bytes this operand occupies in an encoded instruction.
    pub const fn encoded_width(self) -> usize {
        match self {
            OperandType::Register
            | OperandType::Size
            | OperandType::Comparison
            | OperandType::Int8 => 1,
            OperandType::Address | OperandType::Offset | OperandType::Int16 => 2,
            OperandType::Int32 => 4,
        }
    }

    /// Human-readable tag name.
    pub const fn name(self) -> &'static str {
        match self {
            OperandType::Register => "Register",
            OperandType::Address => "Address",
            OperandType::Size => "Size",
            OperandType::Offset => "Offset",
            OperandType::Comparison => "Comparison",
            OperandType::Int8 => "Int8",
            OperandType::Int16 => "Int16",
            OperandType::Int32 => "Int32",
        }
    }
}

impl fmt::Display for OperandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison predicate carried by a `Comparison` operand.
///
/// The discriminant is the encoded byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Predicate {
    Lt = 0,
    Le = 1,
    Eq = 2,
    Ge = 3,
    Gt = 4,
    Ne = 5,
}

impl Predicate {
    /// All predicates in encoding order.
    pub const ALL: [Predicate; 6] = [
        Predicate::Lt,
        Predicate::Le,
        Predicate::Eq,
        Predicate::Ge,
        Predicate::Gt,
        Predicate::Ne,
    ];

    /// Decodes a predicate byte.
    pub const fn from_byte(byte: u8) -> Option<Predicate> {
        match byte {
            0 => Some(Predicate::Lt),
            1 => Some(Predicate::Le),
            2 => Some(Predicate::Eq),
            3 => Some(Predicate::Ge),
            4 => Some(Predicate::Gt),
            5 => Some(Predicate::Ne),
            _ => None,
        }
    }

    /// Tests the predicate against a comparison outcome.
    ///
    /// An `Unordered` outcome satisfies only `Ne`, as with IEEE 754 NaN
    /// comparisons.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytevm::{CompareResult, Predicate};
    ///
    /// assert!(Predicate::Le.holds(CompareResult::Equal));
    /// assert!(!Predicate::Gt.holds(CompareResult::Less));
    /// assert!(Predicate::Ne.holds(CompareResult::Unordered));
    /// ```
    pub const fn holds(self, result: CompareResult) -> bool {
        use CompareResult::*;
        match self {
            Predicate::Lt => matches!(result, Less),
            Predicate::Le => matches!(result, Less | Equal),
            Predicate::Eq => matches!(result, Equal),
            Predicate::Ge => matches!(result, Greater | Equal),
            Predicate::Gt => matches!(result, Greater),
            Predicate::Ne => !matches!(result, Equal),
        }
    }

    /// Mnemonic used by the disassembler.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Predicate::Lt => "LT",
            Predicate::Le => "LE",
            Predicate::Eq => "EQ",
            Predicate::Ge => "GE",
            Predicate::Gt => "GT",
            Predicate::Ne => "NE",
        }
    }
}

/// A resolved operand.
///
/// All three immediate tags (`Int8`, `Int16`, `Int32`) resolve to
/// [`Operand::Immediate`], sign-extended to 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Register(u8),
    Address(u16),
    Size(Width),
    Offset(i16),
    Comparison(Predicate),
    Immediate(i64),
}

impl Operand {
    /// Returns true if this operand can fill a slot of type `ty`.
    pub const fn fits(&self, ty: OperandType) -> bool {
        matches!(
            (self, ty),
            (Operand::Register(_), OperandType::Register)
                | (Operand::Address(_), OperandType::Address)
                | (Operand::Size(_), OperandType::Size)
                | (Operand::Offset(_), OperandType::Offset)
                | (Operand::Comparison(_), OperandType::Comparison)
                | (
                    Operand::Immediate(_),
                    OperandType::Int8 | OperandType::Int16 | OperandType::Int32
                )
        )
    }
}
