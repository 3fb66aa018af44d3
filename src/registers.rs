//! # Register File
//!
//! Sixteen general-purpose registers and the comparison flags register.
//!
//! Registers are untyped 64-bit storage. The instruction (or caller) reading a
//! register decides how its bits are interpreted, so reading a register under a
//! different width or signedness than it was written with is a plain bit
//! reinterpretation and never a fault:
//!
//! ```
//! use bytevm::{RegisterFile, ScalarType, Value};
//!
//! let mut regs = RegisterFile::new();
//! regs.set(3, Value::I8(-1)).unwrap();
//!
//! assert_eq!(regs.get(3, ScalarType::I8).unwrap(), Value::I8(-1));
//! assert_eq!(regs.get(3, ScalarType::U8).unwrap(), Value::U8(255));
//! assert_eq!(regs.get(3, ScalarType::I64).unwrap(), Value::I64(255));
//! ```

use crate::ExecutionError;
use std::cmp::Ordering;

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 16;

/// Interpretation requested when reading a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl ScalarType {
    /// Width of the type in bytes.
    pub const fn width_bytes(self) -> usize {
        match self {
            ScalarType::I8 | ScalarType::U8 => 1,
            ScalarType::I16 | ScalarType::U16 => 2,
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 => 4,
            ScalarType::I64 | ScalarType::U64 | ScalarType::F64 => 8,
        }
    }

    /// Reinterprets the low bits of a raw register slot as this type.
    pub fn interpret(self, raw: u64) -> Value {
        match self {
            ScalarType::I8 => Value::I8(raw as u8 as i8),
            ScalarType::I16 => Value::I16(raw as u16 as i16),
            ScalarType::I32 => Value::I32(raw as u32 as i32),
            ScalarType::I64 => Value::I64(raw as i64),
            ScalarType::U8 => Value::U8(raw as u8),
            ScalarType::U16 => Value::U16(raw as u16),
            ScalarType::U32 => Value::U32(raw as u32),
            ScalarType::U64 => Value::U64(raw),
            ScalarType::F32 => Value::F32(f32::from_bits(raw as u32)),
            ScalarType::F64 => Value::F64(f64::from_bits(raw)),
        }
    }
}

/// A typed scalar read from or written to a register.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Value {
    /// The type of this value.
    pub const fn scalar_type(&self) -> ScalarType {
        match self {
            Value::I8(_) => ScalarType::I8,
            Value::I16(_) => ScalarType::I16,
            Value::I32(_) => ScalarType::I32,
            Value::I64(_) => ScalarType::I64,
            Value::U8(_) => ScalarType::U8,
            Value::U16(_) => ScalarType::U16,
            Value::U32(_) => ScalarType::U32,
            Value::U64(_) => ScalarType::U64,
            Value::F32(_) => ScalarType::F32,
            Value::F64(_) => ScalarType::F64,
        }
    }

    /// Bit pattern of the value, zero-extended to 64 bits.
    pub fn to_bits(self) -> u64 {
        match self {
            Value::I8(v) => v as u8 as u64,
            Value::I16(v) => v as u16 as u64,
            Value::I32(v) => v as u32 as u64,
            Value::I64(v) => v as u64,
            Value::U8(v) => v as u64,
            Value::U16(v) => v as u64,
            Value::U32(v) => v as u64,
            Value::U64(v) => v,
            Value::F32(v) => v.to_bits() as u64,
            Value::F64(v) => v.to_bits(),
        }
    }
}

/// Outcome of the most recent comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareResult {
    Less,
    /// Also the state after construction and reset.
    #[default]
    Equal,
    Greater,
    /// At least one operand of a float comparison was NaN.
    Unordered,
}

impl From<Ordering> for CompareResult {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => CompareResult::Less,
            Ordering::Equal => CompareResult::Equal,
            Ordering::Greater => CompareResult::Greater,
        }
    }
}

impl From<Option<Ordering>> for CompareResult {
    fn from(ordering: Option<Ordering>) -> Self {
        ordering.map_or(CompareResult::Unordered, CompareResult::from)
    }
}

/// General-purpose registers plus the flags register.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterFile {
    regs: [u64; REGISTER_COUNT],
    flags: CompareResult,
}

impl RegisterFile {
    /// Creates a register file with every register zero and flags `Equal`.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(index: u8) -> Result<usize, ExecutionError> {
        let idx = index as usize;
        if idx < REGISTER_COUNT {
            Ok(idx)
        } else {
            Err(ExecutionError::InvalidRegister(index))
        }
    }

    /// Validates a register index without touching it.
    pub fn check(index: u8) -> Result<(), ExecutionError> {
        Self::slot(index).map(|_| ())
    }

    /// Reads the raw 64-bit slot.
    pub fn read_raw(&self, index: u8) -> Result<u64, ExecutionError> {
        Ok(self.regs[Self::slot(index)?])
    }

    /// Overwrites the raw 64-bit slot.
    pub fn write_raw(&mut self, index: u8, bits: u64) -> Result<(), ExecutionError> {
        self.regs[Self::slot(index)?] = bits;
        Ok(())
    }

    /// Reads register `index` interpreted as `as_type`.
    ///
    /// Only the low `as_type.width_bytes()` bytes take part; the rest of the
    /// slot is ignored.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::InvalidRegister`] if `index >= REGISTER_COUNT`.
    pub fn get(&self, index: u8, as_type: ScalarType) -> Result<Value, ExecutionError> {
        Ok(as_type.interpret(self.read_raw(index)?))
    }

    /// Stores `value`'s bit pattern, zero-extended, into register `index`.
    pub fn set(&mut self, index: u8, value: Value) -> Result<(), ExecutionError> {
        self.write_raw(index, value.to_bits())
    }

    /// Returns the flags register.
    pub fn flags(&self) -> CompareResult {
        self.flags
    }

    /// Overwrites the flags register.
    pub fn set_flags(&mut self, result: CompareResult) {
        self.flags = result;
    }

    /// All raw register slots, `R0` first.
    pub fn raw(&self) -> &[u64; REGISTER_COUNT] {
        &self.regs
    }
}
