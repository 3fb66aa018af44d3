//! Disassembler Module
//!
//! Converts bytecode into human-readable listings for debuggers and fault
//! diagnostics. Decoding goes through the same [`decode_instruction`] the
//! machine uses, so a listing always shows what would execute.

pub mod formatter;

pub use formatter::{format_instruction, format_item, format_listing};

use crate::decoder::{decode_instruction, Instruction};

/// One entry of a disassembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisassembledItem {
    /// A successfully decoded instruction
    Instruction(Instruction),

    /// A byte that does not start a valid instruction, shown as `.byte`
    Byte { address: u16, value: u8 },
}

impl DisassembledItem {
    /// Address of the first byte of this item.
    pub fn address(&self) -> u16 {
        match self {
            DisassembledItem::Instruction(instr) => instr.address,
            DisassembledItem::Byte { address, .. } => *address,
        }
    }

    /// Number of bytes this item covers.
    pub fn size_bytes(&self) -> usize {
        match self {
            DisassembledItem::Instruction(instr) => instr.size_bytes,
            DisassembledItem::Byte { .. } => 1,
        }
    }

    /// The raw bytes this item covers.
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            DisassembledItem::Instruction(instr) => instr.encode(),
            DisassembledItem::Byte { value, .. } => vec![*value],
        }
    }
}

/// Options controlling disassembly output
#[derive(Debug, Clone, Copy, Default)]
pub struct DisassemblyOptions {
    /// Address of `bytes[0]` (affects address display and branch operands)
    pub start_address: u16,

    /// Whether listings include the raw instruction bytes
    pub hex_dump: bool,
}

/// Disassemble a byte slice
///
/// # Arguments
///
/// * `bytes` - The bytecode to disassemble
/// * `options` - Disassembly options controlling addresses
///
/// # Returns
///
/// One item per decoded instruction. A byte that fails to decode (unknown
/// opcode, invalid operand, or an instruction cut off by the end of the
/// buffer) becomes a single [`DisassembledItem::Byte`] and decoding resumes at
/// the next byte.
///
/// # Examples
///
/// ```
/// use bytevm::{disassemble, format_instruction, DisassembledItem, DisassemblyOptions};
///
/// // CMP R0, R1 ; BR EQ, +2 ; 0xFF
/// let items = disassemble(&[0x30, 0x00, 0x01, 0x36, 0x02, 0x02, 0x00, 0xFF], DisassemblyOptions::default());
///
/// assert_eq!(items.len(), 3);
/// match &items[1] {
///     DisassembledItem::Instruction(instr) => assert_eq!(format_instruction(instr), "BR EQ, +2"),
///     other => panic!("unexpected {other:?}"),
/// }
/// assert_eq!(items[2], DisassembledItem::Byte { address: 7, value: 0xFF });
/// ```
pub fn disassemble(bytes: &[u8], options: DisassemblyOptions) -> Vec<DisassembledItem> {
    let mut items = Vec::new();
    let mut pc = 0;
    let mut address = options.start_address;

    while pc < bytes.len() {
        match decode_instruction(&bytes[pc..], address) {
            Ok(instr) => {
                pc += instr.size_bytes;
                address = address.wrapping_add(instr.size_bytes as u16);
                items.push(DisassembledItem::Instruction(instr));
            }
            Err(_) => {
                items.push(DisassembledItem::Byte {
                    address,
                    value: bytes[pc],
                });
                pc += 1;
                address = address.wrapping_add(1);
            }
        }
    }

    items
}
