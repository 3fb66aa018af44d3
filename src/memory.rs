//! # Memory
//!
//! This module provides the machine's 1024-byte address space.
//!
//! ## Design Principles
//!
//! - Every access is bounds-checked: `address + width <= MEMORY_SIZE`
//! - A failed access performs no mutation
//! - Multi-byte values are little-endian, everywhere
//! - Memory is owned by a single machine; there is no global RAM

use crate::ExecutionError;

/// Size of the address space in bytes.
pub const MEMORY_SIZE: usize = 1024;

/// Width of a memory access or `Size` operand.
///
/// The discriminant is the width in bytes, which is also its encoding as a
/// `Size` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Width {
    /// 1 byte (8 bits)
    Byte = 1,
    /// 2 bytes (16 bits)
    Half = 2,
    /// 4 bytes (32 bits)
    Word = 4,
    /// 8 bytes (64 bits)
    Double = 8,
}

impl Width {
    /// All widths, narrowest first.
    pub const ALL: [Width; 4] = [Width::Byte, Width::Half, Width::Word, Width::Double];

    /// Decodes a `Size` operand byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytevm::Width;
    ///
    /// assert_eq!(Width::from_byte(4), Some(Width::Word));
    /// assert_eq!(Width::from_byte(3), None);
    /// ```
    pub const fn from_byte(byte: u8) -> Option<Width> {
        match byte {
            1 => Some(Width::Byte),
            2 => Some(Width::Half),
            4 => Some(Width::Word),
            8 => Some(Width::Double),
            _ => None,
        }
    }

    /// Width in bytes.
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Width in bits.
    pub const fn bits(self) -> u32 {
        (self as u32) * 8
    }

    /// Keeps only the low `self` bytes of `value`.
    pub const fn truncate(self, value: u64) -> u64 {
        match self {
            Width::Double => value,
            _ => value & ((1u64 << self.bits()) - 1),
        }
    }

    /// Sign-extends the low `self` bytes of `value` to 64 bits.
    pub const fn sign_extend(self, value: u64) -> u64 {
        let shift = 64 - self.bits();
        (((value << shift) as i64) >> shift) as u64
    }
}

/// The machine's byte-addressable memory.
///
/// All 1024 cells start at zero. Reads and writes of 1, 2, 4 or 8 bytes are
/// little-endian and fail with [`ExecutionError::OutOfBounds`] when any byte
/// of the access lies past the end of memory.
///
/// # Examples
///
/// ```
/// use bytevm::{Memory, Width};
///
/// let mut mem = Memory::new();
/// mem.write(0x10, Width::Half, 0xBEEF).unwrap();
///
/// assert_eq!(mem.read(0x10, Width::Half).unwrap(), 0xBEEF);
/// assert_eq!(mem.as_bytes()[0x10], 0xEF); // low byte first
///
/// assert!(mem.read(1021, Width::Word).is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    data: Box<[u8; MEMORY_SIZE]>,
}

impl Memory {
    /// Creates zero-initialized memory.
    pub fn new() -> Self {
        Self {
            data: Box::new([0; MEMORY_SIZE]),
        }
    }

    /// Returns the byte range of an access, or `OutOfBounds`.
    fn range(address: usize, len: usize) -> Result<std::ops::Range<usize>, ExecutionError> {
        match address.checked_add(len) {
            Some(end) if end <= MEMORY_SIZE => Ok(address..end),
            _ => Err(ExecutionError::OutOfBounds {
                address: address as u64,
                width: len,
            }),
        }
    }

    /// Checks that an access of `width` bytes at `address` fits.
    pub fn check(address: usize, width: Width) -> Result<(), ExecutionError> {
        Self::range(address, width.bytes()).map(|_| ())
    }

    /// Reads a little-endian value of `width` bytes, zero-extended to 64 bits.
    pub fn read(&self, address: usize, width: Width) -> Result<u64, ExecutionError> {
        let range = Self::range(address, width.bytes())?;
        let mut buf = [0u8; 8];
        buf[..width.bytes()].copy_from_slice(&self.data[range]);
        Ok(u64::from_le_bytes(buf))
    }

    /// Writes the low `width` bytes of `value` in little-endian order.
    ///
    /// Nothing is written if the access is out of bounds.
    pub fn write(&mut self, address: usize, width: Width, value: u64) -> Result<(), ExecutionError> {
        let range = Self::range(address, width.bytes())?;
        self.data[range].copy_from_slice(&value.to_le_bytes()[..width.bytes()]);
        Ok(())
    }

    /// Returns `len` bytes starting at `address`.
    pub fn slice(&self, address: usize, len: usize) -> Result<&[u8], ExecutionError> {
        let range = Self::range(address, len)?;
        Ok(&self.data[range])
    }

    /// Copies `bytes` into memory starting at `address`.
    ///
    /// Used for program loading. Nothing is written unless the whole buffer
    /// fits.
    pub fn load(&mut self, address: usize, bytes: &[u8]) -> Result<(), ExecutionError> {
        let range = Self::range(address, bytes.len())?;
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Zeroes every cell.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Read-only view of the whole address space.
    pub fn as_bytes(&self) -> &[u8; MEMORY_SIZE] {
        &self.data
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|&&b| b != 0).count();
        f.debug_struct("Memory")
            .field("size", &MEMORY_SIZE)
            .field("nonzero_bytes", &used)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_starts_zeroed() {
        let mem = Memory::new();
        assert!(mem.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_little_endian_layout() {
        let mut mem = Memory::new();
        mem.write(0x20, Width::Double, 0x0102_0304_0506_0708).unwrap();

        assert_eq!(
            mem.slice(0x20, 8).unwrap(),
            &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(mem.read(0x20, Width::Word).unwrap(), 0x0506_0708);
    }

    #[test]
    fn test_last_cells_are_addressable() {
        let mut mem = Memory::new();
        mem.write(1016, Width::Double, u64::MAX).unwrap();
        mem.write(1023, Width::Byte, 0x7F).unwrap();

        assert_eq!(mem.read(1023, Width::Byte).unwrap(), 0x7F);
        assert_eq!(mem.read(1022, Width::Half).unwrap(), 0x7FFF);
    }

    #[test]
    fn test_out_of_bounds_write_is_not_partial() {
        let mut mem = Memory::new();
        let err = mem.write(1022, Width::Word, 0xFFFF_FFFF).unwrap_err();

        assert_eq!(err, ExecutionError::OutOfBounds { address: 1022, width: 4 });
        assert_eq!(mem.as_bytes()[1022], 0);
        assert_eq!(mem.as_bytes()[1023], 0);
    }

    #[test]
    fn test_address_overflow_is_out_of_bounds() {
        let mem = Memory::new();
        assert!(matches!(
            mem.read(usize::MAX, Width::Half),
            Err(ExecutionError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_width_extension() {
        assert_eq!(Width::Byte.sign_extend(0x80), 0xFFFF_FFFF_FFFF_FF80);
        assert_eq!(Width::Byte.sign_extend(0x7F), 0x7F);
        assert_eq!(Width::Half.truncate(0x1234_5678), 0x5678);
        assert_eq!(Width::Double.sign_extend(u64::MAX), u64::MAX);
        assert_eq!(Width::Double.truncate(u64::MAX), u64::MAX);
    }
}
