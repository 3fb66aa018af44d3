//! # Stack Operations
//!
//! The stack grows downward from the configured stack top in 8-byte
//! little-endian slots. SP points at the most recently pushed slot and equals
//! the stack top when the stack is empty.
//!
//! - PUSH: push a register
//! - POP: pop into a register
//!
//! CALL, CALLA and RET use the same helpers for return addresses.

use super::Flow;
use crate::decoder::Instruction;
use crate::machine::{Machine, STACK_SLOT_BYTES};
use crate::memory::Width;
use crate::ExecutionError;

/// Pushes a 64-bit value.
///
/// Faults with [`ExecutionError::StackOverflow`] if the slot would start below
/// the stack limit; nothing is written in that case.
pub(crate) fn push_value(machine: &mut Machine, value: u64) -> Result<(), ExecutionError> {
    let sp = match machine.sp.checked_sub(STACK_SLOT_BYTES) {
        Some(sp) if sp >= machine.config.stack_limit => sp,
        _ => return Err(ExecutionError::StackOverflow),
    };

    machine.memory.write(sp as usize, Width::Double, value)?;
    machine.sp = sp;
    Ok(())
}

/// Reads the top slot without popping it.
///
/// Faults with [`ExecutionError::StackUnderflow`] if the stack is empty.
pub(crate) fn peek_value(machine: &Machine) -> Result<u64, ExecutionError> {
    if machine.sp >= machine.config.stack_top {
        return Err(ExecutionError::StackUnderflow);
    }
    machine.memory.read(machine.sp as usize, Width::Double)
}

/// Discards the top slot. Only call after a successful [`peek_value`].
pub(crate) fn drop_value(machine: &mut Machine) {
    machine.sp += STACK_SLOT_BYTES;
}

/// Executes PUSH.
pub(crate) fn execute_push(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let value = machine.registers.read_raw(instr.register(0)?)?;

    push_value(machine, value)?;
    Ok(Flow::Next)
}

/// Executes POP.
pub(crate) fn execute_pop(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let value = peek_value(machine)?;

    machine.registers.write_raw(dst, value)?;
    drop_value(machine);
    Ok(Flow::Next)
}
