//! # Shift and Extension Instructions
//!
//! - SHL / SHR / SAR: shift by a register amount
//! - SHLI / SHRI: shift by an immediate amount
//! - SEXT / ZEXT: re-extend the low bytes of a register
//!
//! Shift amounts are unsigned. Amounts of 64 or more shift every bit out: SHL
//! and SHR give 0, SAR gives 0 or -1 depending on the sign bit.

use super::load_store::Extension;
use super::Flow;
use crate::decoder::Instruction;
use crate::machine::Machine;
use crate::ExecutionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shift {
    Left,
    Logical,
    Arithmetic,
}

impl Shift {
    pub(crate) fn apply(self, value: u64, amount: u64) -> u64 {
        match (self, u32::try_from(amount)) {
            (Shift::Left, Ok(n)) if n < 64 => value << n,
            (Shift::Logical, Ok(n)) if n < 64 => value >> n,
            (Shift::Arithmetic, Ok(n)) if n < 64 => ((value as i64) >> n) as u64,
            (Shift::Arithmetic, _) => ((value as i64) >> 63) as u64,
            _ => 0,
        }
    }
}

/// Executes SHL, SHR and SAR: `dst <- dst shift src`.
pub(crate) fn execute_shift(
    machine: &mut Machine,
    instr: &Instruction,
    shift: Shift,
) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let src = instr.register(1)?;
    let value = machine.registers.read_raw(dst)?;
    let amount = machine.registers.read_raw(src)?;

    machine.registers.write_raw(dst, shift.apply(value, amount))?;
    Ok(Flow::Next)
}

/// Executes SHLI and SHRI. The immediate is read as an unsigned amount.
pub(crate) fn execute_shift_immediate(
    machine: &mut Machine,
    instr: &Instruction,
    shift: Shift,
) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let amount = instr.immediate(1)? as u8 as u64;
    let value = machine.registers.read_raw(dst)?;

    machine.registers.write_raw(dst, shift.apply(value, amount))?;
    Ok(Flow::Next)
}

/// Executes SEXT and ZEXT on the low `size` bytes of `dst`.
pub(crate) fn execute_extend(
    machine: &mut Machine,
    instr: &Instruction,
    extension: Extension,
) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let width = instr.size(1)?;
    let value = machine.registers.read_raw(dst)?;

    machine.registers.write_raw(dst, extension.apply(width, value))?;
    Ok(Flow::Next)
}
