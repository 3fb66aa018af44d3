//! # Floating-Point Instructions
//!
//! Registers hold IEEE 754 `f64` bit patterns for FADD, FSUB, FMUL, FDIV and
//! FTOI. FNARROW and FWIDEN convert between `f64` and an `f32` held in the low
//! 32 bits of a register. Float arithmetic never faults; division by zero
//! gives an infinity or NaN.

use super::Flow;
use crate::decoder::Instruction;
use crate::machine::Machine;
use crate::ExecutionError;

/// Smallest `f64` above the `i64` range (2^63).
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Executes FADD, FSUB, FMUL and FDIV: `dst <- dst op src`.
pub(crate) fn execute_arithmetic<F>(
    machine: &mut Machine,
    instr: &Instruction,
    op: F,
) -> Result<Flow, ExecutionError>
where
    F: Fn(f64, f64) -> f64,
{
    let dst = instr.register(0)?;
    let src = instr.register(1)?;
    let a = f64::from_bits(machine.registers.read_raw(dst)?);
    let b = f64::from_bits(machine.registers.read_raw(src)?);

    machine.registers.write_raw(dst, op(a, b).to_bits())?;
    Ok(Flow::Next)
}

/// Executes ITOF: `dst <- src as f64`, reading `src` as a signed integer.
pub(crate) fn execute_itof(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let src = instr.register(1)?;
    let value = machine.registers.read_raw(src)? as i64;

    machine.registers.write_raw(dst, (value as f64).to_bits())?;
    Ok(Flow::Next)
}

/// Executes FTOI: `dst <- trunc(src)` as a signed integer.
///
/// NaN and values whose truncation falls outside `i64` fault with
/// [`ExecutionError::ArithmeticOverflow`].
pub(crate) fn execute_ftoi(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let src = instr.register(1)?;
    let value = f64::from_bits(machine.registers.read_raw(src)?).trunc();

    // NaN fails both comparisons
    if !(value >= -I64_LIMIT && value < I64_LIMIT) {
        return Err(ExecutionError::ArithmeticOverflow);
    }
    machine.registers.write_raw(dst, value as i64 as u64)?;
    Ok(Flow::Next)
}

/// Executes FNARROW: rounds the `f64` in `dst` to `f32`.
pub(crate) fn execute_fnarrow(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let value = f64::from_bits(machine.registers.read_raw(dst)?);

    machine.registers.write_raw(dst, (value as f32).to_bits() as u64)?;
    Ok(Flow::Next)
}

/// Executes FWIDEN: widens the `f32` in the low half of `dst` to `f64`.
pub(crate) fn execute_fwiden(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let value = f32::from_bits(machine.registers.read_raw(dst)? as u32);

    machine.registers.write_raw(dst, (value as f64).to_bits())?;
    Ok(Flow::Next)
}

#[cfg(test)]
mod tests {
    use crate::machine::{Machine, Status};
    use crate::registers::{ScalarType, Value};
    use crate::ExecutionError;

    #[test]
    fn test_ftoi_truncates_toward_zero() {
        // FTOI R0, R1
        let mut machine = Machine::from_program(&[0x2D, 0x00, 0x01]).unwrap();
        machine.registers_mut().set(1, Value::F64(-2.9)).unwrap();
        machine.step();

        assert_eq!(machine.registers().get(0, ScalarType::I64).unwrap(), Value::I64(-2));
    }

    #[test]
    fn test_ftoi_nan_faults() {
        let mut machine = Machine::from_program(&[0x2D, 0x00, 0x01]).unwrap();
        machine.registers_mut().set(1, Value::F64(f64::NAN)).unwrap();

        assert_eq!(machine.step(), Status::Faulted(ExecutionError::ArithmeticOverflow));
    }

    #[test]
    fn test_ftoi_out_of_range_faults() {
        let mut machine = Machine::from_program(&[0x2D, 0x00, 0x01]).unwrap();
        machine.registers_mut().set(1, Value::F64(1e19)).unwrap();

        assert_eq!(machine.step(), Status::Faulted(ExecutionError::ArithmeticOverflow));
    }

    #[test]
    fn test_fdiv_by_zero_is_infinite() {
        // FDIV R0, R1
        let mut machine = Machine::from_program(&[0x2B, 0x00, 0x01]).unwrap();
        machine.registers_mut().set(0, Value::F64(1.0)).unwrap();
        machine.registers_mut().set(1, Value::F64(0.0)).unwrap();

        assert_eq!(machine.step(), Status::Running);
        assert_eq!(
            machine.registers().get(0, ScalarType::F64).unwrap(),
            Value::F64(f64::INFINITY)
        );
    }

    #[test]
    fn test_narrow_then_widen() {
        // FNARROW R0 ; FWIDEN R0
        let mut machine = Machine::from_program(&[0x2E, 0x00, 0x2F, 0x00]).unwrap();
        machine.registers_mut().set(0, Value::F64(0.5)).unwrap();

        machine.step();
        assert_eq!(machine.registers().get(0, ScalarType::F32).unwrap(), Value::F32(0.5));
        assert_eq!(machine.registers().read_raw(0).unwrap() >> 32, 0);

        machine.step();
        assert_eq!(machine.registers().get(0, ScalarType::F64).unwrap(), Value::F64(0.5));
    }
}
