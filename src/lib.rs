//! # bytevm
//!
//! A deterministic bytecode interpreter with a 1024-byte address space, sixteen
//! untyped 64-bit registers and a small, closed instruction set with typed
//! operands.
//!
//! The crate provides the execution engine only: memory and register model,
//! a table-driven opcode set, a pure operand decoder and the fetch-decode-execute
//! loop. Loading programs from source text, front ends and persistence are left
//! to callers.
//!
//! ## Quick Start
//!
//! ```rust
//! use bytevm::{encode, Machine, Opcode, Operand, Status};
//!
//! // STI8 $0000, #200 ; HLT
//! let mut program = encode(Opcode::Sti8, &[Operand::Address(0), Operand::Immediate(200)]).unwrap();
//! program.extend(encode(Opcode::Hlt, &[]).unwrap());
//!
//! let mut machine = Machine::from_program(&program).unwrap();
//! assert_eq!(machine.run_to_completion(), Status::Halted);
//! assert_eq!(machine.memory().as_bytes()[0], 200);
//! ```
//!
//! ## Architecture
//!
//! - **Closed instruction set**: every opcode has exactly one entry in
//!   [`OPCODE_TABLE`], and the executor matches exhaustively over [`Opcode`]
//! - **Owned state**: each [`Machine`] owns its memory and registers, so
//!   independent machines never share mutable state
//! - **Instruction-atomic faults**: a faulting instruction leaves the machine
//!   exactly as it was after the previous instruction
//! - **Little-endian** encoding for every multi-byte value
//!
//! ## Modules
//!
//! - `memory` - bounds-checked 1KB memory
//! - `registers` - register file, scalar reinterpretation and comparison flags
//! - `operands` - operand type tags, widths and predicates
//! - `opcodes` - opcode metadata table
//! - `decoder` / `encoder` - byte encoding of instructions
//! - `machine` - machine state and the execution loop
//! - `disassembler` - text rendering for debuggers and diagnostics

pub mod decoder;
pub mod disassembler;
pub mod encoder;
pub mod machine;
pub mod memory;
pub mod opcodes;
pub mod operands;
pub mod registers;

// Internal instruction implementations (not part of public API)
mod instructions;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export public API
pub use decoder::{decode_instruction, Instruction};
pub use disassembler::{
    disassemble, format_instruction, format_item, format_listing, DisassembledItem,
    DisassemblyOptions,
};
pub use encoder::{encode, EncodeError};
pub use machine::{
    ConfigError, FaultReport, Machine, MachineConfig, RunOutcome, Snapshot, Status,
};
pub use memory::{Memory, Width, MEMORY_SIZE};
pub use opcodes::{lookup, Opcode, OpcodeMetadata, OPCODE_COUNT, OPCODE_TABLE};
pub use operands::{Operand, OperandType, Predicate};
pub use registers::{CompareResult, RegisterFile, ScalarType, Value, REGISTER_COUNT};

use thiserror::Error;

/// Errors that stop execution of an instruction.
///
/// Every variant is local to the instruction that raised it. The machine turns
/// it into [`Status::Faulted`] and never retries; callers observe faults only
/// through the machine status and [`Machine::fault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The opcode byte has no entry in the opcode table.
    #[error("unknown opcode 0x{0:02X}")]
    UnknownOpcode(u8),

    /// The byte stream ends before the instruction does.
    ///
    /// `needed` and `available` count whole-instruction bytes, opcode
    /// included. `opcode` is `None` when not even the opcode byte is present.
    #[error("truncated instruction: {needed} bytes needed, {available} available")]
    TruncatedInstruction {
        opcode: Option<u8>,
        needed: usize,
        available: usize,
    },

    /// A `Size` operand byte is not one of 1, 2, 4 or 8.
    #[error("invalid size operand {0}")]
    InvalidSize(u8),

    /// A `Comparison` operand byte does not name a predicate.
    #[error("invalid comparison operand {0}")]
    InvalidComparison(u8),

    /// A memory access would run past the end of the address space.
    #[error("access of {width} bytes at address {address:#06X} is out of bounds")]
    OutOfBounds { address: u64, width: usize },

    /// A register index is not below the register count.
    #[error("invalid register R{0}")]
    InvalidRegister(u8),

    /// A MOVLANE lane index is not in `0..4`.
    #[error("lane index {0} is outside 0..4")]
    InvalidLane(i64),

    /// A relative branch would leave the address space.
    #[error("jump target {0} is outside the address space")]
    InvalidJumpTarget(i32),

    /// Integer division or remainder by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Checked arithmetic overflowed, or a float did not fit an integer.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// A push would grow the stack below its limit.
    #[error("stack overflow")]
    StackOverflow,

    /// A pop or return found the stack empty.
    #[error("stack underflow")]
    StackUnderflow,

    /// An operand slot did not hold the type the handler expected.
    ///
    /// Only reachable if a handler disagrees with the opcode table.
    #[error("operand {slot} of opcode 0x{opcode:02X} has the wrong type")]
    OperandMismatch { opcode: u8, slot: usize },
}
