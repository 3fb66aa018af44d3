//! # Load and Store Instructions
//!
//! This module implements memory transfers:
//! - LOAD / LOADS: read `Size` bytes at an absolute address, zero- or sign-extended
//! - STORE: write the low `Size` bytes of a register to an absolute address
//! - STI8: write an 8-bit immediate to an absolute address
//! - LOADR / STORER: the same transfers through an address held in a register

use super::Flow;
use crate::decoder::Instruction;
use crate::machine::Machine;
use crate::memory::Width;
use crate::ExecutionError;

/// How a narrow value fills a 64-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extension {
    Zero,
    Sign,
}

impl Extension {
    pub(crate) fn apply(self, width: Width, value: u64) -> u64 {
        match self {
            Extension::Zero => width.truncate(value),
            Extension::Sign => width.sign_extend(value),
        }
    }
}

/// Converts a register's contents to a memory address.
///
/// Values that do not fit `usize` are necessarily out of bounds.
fn register_address(raw: u64, width: Width) -> Result<usize, ExecutionError> {
    usize::try_from(raw).map_err(|_| ExecutionError::OutOfBounds {
        address: raw,
        width: width.bytes(),
    })
}

/// Executes LOAD and LOADS: `dst <- extend(mem[address..address + size])`.
pub(crate) fn execute_load(
    machine: &mut Machine,
    instr: &Instruction,
    extension: Extension,
) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let width = instr.size(1)?;
    let address = instr.address_operand(2)?;

    let value = machine.memory.read(address as usize, width)?;
    machine.registers.write_raw(dst, extension.apply(width, value))?;
    Ok(Flow::Next)
}

/// Executes STORE: `mem[address..address + size] <- low bytes of src`.
pub(crate) fn execute_store(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let width = instr.size(0)?;
    let address = instr.address_operand(1)?;
    let src = instr.register(2)?;

    let value = machine.registers.read_raw(src)?;
    machine.memory.write(address as usize, width, value)?;
    Ok(Flow::Next)
}

/// Executes STI8: stores one immediate byte.
///
/// The immediate is written as its low byte, so `STI8 $0000, #200` leaves 200
/// in memory even though the operand decodes as -56.
pub(crate) fn execute_sti8(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let address = instr.address_operand(0)?;
    let value = instr.immediate(1)?;

    machine.memory.write(address as usize, Width::Byte, value as u64)?;
    Ok(Flow::Next)
}

/// Executes LOADR: `dst <- zero_extend(mem[R_addr..R_addr + size])`.
pub(crate) fn execute_loadr(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let width = instr.size(1)?;
    let addr_reg = instr.register(2)?;

    let address = register_address(machine.registers.read_raw(addr_reg)?, width)?;
    let value = machine.memory.read(address, width)?;
    machine.registers.write_raw(dst, value)?;
    Ok(Flow::Next)
}

/// Executes STORER: `mem[R_addr..R_addr + size] <- low bytes of src`.
pub(crate) fn execute_storer(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let width = instr.size(0)?;
    let addr_reg = instr.register(1)?;
    let src = instr.register(2)?;

    let address = register_address(machine.registers.read_raw(addr_reg)?, width)?;
    let value = machine.registers.read_raw(src)?;
    machine.memory.write(address, width, value)?;
    Ok(Flow::Next)
}
