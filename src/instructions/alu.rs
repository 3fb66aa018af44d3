//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! This module implements integer arithmetic and logical operations.
//!
//! Signed arithmetic (ADD, SUB, MUL, DIV, MOD, the immediate forms, INC, DEC,
//! NEG) is checked: a result outside `i64` faults with
//! [`ExecutionError::ArithmeticOverflow`] instead of wrapping. DIVU and MODU
//! treat both operands as `u64`. Logical operations work on raw bits and never
//! fault.
//!
//! Two-register forms compute `dst <- dst op src`.

use super::Flow;
use crate::decoder::Instruction;
use crate::machine::Machine;
use crate::ExecutionError;

/// Reads `dst` and `src` as signed 64-bit values.
fn signed_operands(machine: &Machine, instr: &Instruction) -> Result<(u8, i64, i64), ExecutionError> {
    let dst = instr.register(0)?;
    let src = instr.register(1)?;
    let a = machine.registers.read_raw(dst)? as i64;
    let b = machine.registers.read_raw(src)? as i64;
    Ok((dst, a, b))
}

/// Executes ADD, SUB and MUL.
pub(crate) fn execute_checked<F>(
    machine: &mut Machine,
    instr: &Instruction,
    op: F,
) -> Result<Flow, ExecutionError>
where
    F: Fn(i64, i64) -> Option<i64>,
{
    let (dst, a, b) = signed_operands(machine, instr)?;

    let result = op(a, b).ok_or(ExecutionError::ArithmeticOverflow)?;
    machine.registers.write_raw(dst, result as u64)?;
    Ok(Flow::Next)
}

/// Executes DIV and MOD.
///
/// Division truncates toward zero and the remainder takes the sign of the
/// dividend. `i64::MIN / -1` overflows.
pub(crate) fn execute_signed_division<F>(
    machine: &mut Machine,
    instr: &Instruction,
    op: F,
) -> Result<Flow, ExecutionError>
where
    F: Fn(i64, i64) -> Option<i64>,
{
    let (dst, a, b) = signed_operands(machine, instr)?;

    if b == 0 {
        return Err(ExecutionError::DivisionByZero);
    }
    let result = op(a, b).ok_or(ExecutionError::ArithmeticOverflow)?;
    machine.registers.write_raw(dst, result as u64)?;
    Ok(Flow::Next)
}

/// Executes DIVU and MODU.
pub(crate) fn execute_unsigned_division<F>(
    machine: &mut Machine,
    instr: &Instruction,
    op: F,
) -> Result<Flow, ExecutionError>
where
    F: Fn(u64, u64) -> u64,
{
    let dst = instr.register(0)?;
    let src = instr.register(1)?;
    let a = machine.registers.read_raw(dst)?;
    let b = machine.registers.read_raw(src)?;

    if b == 0 {
        return Err(ExecutionError::DivisionByZero);
    }
    machine.registers.write_raw(dst, op(a, b))?;
    Ok(Flow::Next)
}

/// Executes ADDI, ADDIW and MULI: `dst <- dst op imm`.
pub(crate) fn execute_checked_immediate<F>(
    machine: &mut Machine,
    instr: &Instruction,
    op: F,
) -> Result<Flow, ExecutionError>
where
    F: Fn(i64, i64) -> Option<i64>,
{
    let dst = instr.register(0)?;
    let imm = instr.immediate(1)?;
    let a = machine.registers.read_raw(dst)? as i64;

    let result = op(a, imm).ok_or(ExecutionError::ArithmeticOverflow)?;
    machine.registers.write_raw(dst, result as u64)?;
    Ok(Flow::Next)
}

/// Executes INC, DEC and NEG.
pub(crate) fn execute_checked_unary<F>(
    machine: &mut Machine,
    instr: &Instruction,
    op: F,
) -> Result<Flow, ExecutionError>
where
    F: Fn(i64) -> Option<i64>,
{
    let dst = instr.register(0)?;
    let a = machine.registers.read_raw(dst)? as i64;

    let result = op(a).ok_or(ExecutionError::ArithmeticOverflow)?;
    machine.registers.write_raw(dst, result as u64)?;
    Ok(Flow::Next)
}

/// Executes AND, OR and XOR.
pub(crate) fn execute_logic<F>(
    machine: &mut Machine,
    instr: &Instruction,
    op: F,
) -> Result<Flow, ExecutionError>
where
    F: Fn(u64, u64) -> u64,
{
    let dst = instr.register(0)?;
    let src = instr.register(1)?;
    let a = machine.registers.read_raw(dst)?;
    let b = machine.registers.read_raw(src)?;

    machine.registers.write_raw(dst, op(a, b))?;
    Ok(Flow::Next)
}

/// Executes ANDI and ORI.
///
/// The 16-bit immediate is sign-extended, so `ANDI R0, #-1` keeps every bit.
pub(crate) fn execute_logic_immediate<F>(
    machine: &mut Machine,
    instr: &Instruction,
    op: F,
) -> Result<Flow, ExecutionError>
where
    F: Fn(u64, u64) -> u64,
{
    let dst = instr.register(0)?;
    let imm = instr.immediate(1)? as u64;
    let a = machine.registers.read_raw(dst)?;

    machine.registers.write_raw(dst, op(a, imm))?;
    Ok(Flow::Next)
}

/// Executes NOT (bitwise complement).
pub(crate) fn execute_not(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let a = machine.registers.read_raw(dst)?;

    machine.registers.write_raw(dst, !a)?;
    Ok(Flow::Next)
}
