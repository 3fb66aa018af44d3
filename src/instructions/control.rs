//! # Control Flow Instructions
//!
//! This module implements jumps, conditional branches and subroutine calls:
//! - JMP / JMPA: unconditional jump, relative or absolute
//! - BR / BRA: jump if the predicate holds for the flags register
//! - CALL / CALLA: push the return address, then jump
//! - RET: pop the return address and jump to it
//!
//! Relative offsets are measured from the address of the next instruction, so
//! `JMP +0` is a no-op and `JMP -3` loops on itself. HLT and NOP are handled
//! directly by the dispatcher.
//!
//! A target is only checked when control actually transfers: an untaken branch
//! to an invalid target falls through without faulting.

use super::stack;
use super::Flow;
use crate::decoder::Instruction;
use crate::machine::Machine;
use crate::memory::MEMORY_SIZE;
use crate::ExecutionError;

/// Resolves a relative offset against the next instruction's address.
///
/// # Errors
///
/// [`ExecutionError::InvalidJumpTarget`] if the target lies outside
/// `0..MEMORY_SIZE`.
fn relative_target(instr: &Instruction, offset: i16) -> Result<u16, ExecutionError> {
    let target = instr.next_address() as i32 + offset as i32;
    if target < 0 || target >= MEMORY_SIZE as i32 {
        return Err(ExecutionError::InvalidJumpTarget(target));
    }
    Ok(target as u16)
}

/// Checks an absolute target.
fn absolute_target(address: u64) -> Result<u16, ExecutionError> {
    if address >= MEMORY_SIZE as u64 {
        return Err(ExecutionError::OutOfBounds { address, width: 1 });
    }
    Ok(address as u16)
}

/// Executes JMP (relative).
pub(crate) fn execute_jmp(instr: &Instruction) -> Result<Flow, ExecutionError> {
    let target = relative_target(instr, instr.offset(0)?)?;
    Ok(Flow::Jump(target))
}

/// Executes JMPA (absolute).
pub(crate) fn execute_jmpa(instr: &Instruction) -> Result<Flow, ExecutionError> {
    let target = absolute_target(instr.address_operand(0)? as u64)?;
    Ok(Flow::Jump(target))
}

/// Executes BR: relative jump if the predicate holds.
///
/// # Examples
///
/// `CMP R0, R1 ; BR EQ, +2` skips the next two bytes when R0 == R1.
pub(crate) fn execute_br(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let predicate = instr.predicate(0)?;
    let offset = instr.offset(1)?;

    if !predicate.holds(machine.registers.flags()) {
        return Ok(Flow::Next);
    }
    Ok(Flow::Jump(relative_target(instr, offset)?))
}

/// Executes BRA: absolute jump if the predicate holds.
pub(crate) fn execute_bra(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let predicate = instr.predicate(0)?;
    let address = instr.address_operand(1)?;

    if !predicate.holds(machine.registers.flags()) {
        return Ok(Flow::Next);
    }
    Ok(Flow::Jump(absolute_target(address as u64)?))
}

/// Executes CALL (relative).
///
/// The target is checked before the return address is pushed.
pub(crate) fn execute_call(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let target = relative_target(instr, instr.offset(0)?)?;

    stack::push_value(machine, instr.next_address() as u64)?;
    Ok(Flow::Jump(target))
}

/// Executes CALLA (absolute).
pub(crate) fn execute_calla(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let target = absolute_target(instr.address_operand(0)? as u64)?;

    stack::push_value(machine, instr.next_address() as u64)?;
    Ok(Flow::Jump(target))
}

/// Executes RET.
///
/// The popped slot must hold an address inside memory; anything else faults
/// with `OutOfBounds` and leaves the slot on the stack.
pub(crate) fn execute_ret(machine: &mut Machine) -> Result<Flow, ExecutionError> {
    let target = absolute_target(stack::peek_value(machine)?)?;

    stack::drop_value(machine);
    Ok(Flow::Jump(target))
}
