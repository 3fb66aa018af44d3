//! # Comparison Instructions
//!
//! CMP, CMPU, FCMP and CMPI set the flags register to the ordering of their
//! operands and change nothing else. Branches read the flags afterwards.

use super::Flow;
use crate::decoder::Instruction;
use crate::machine::Machine;
use crate::registers::CompareResult;
use crate::ExecutionError;

fn raw_operands(machine: &Machine, instr: &Instruction) -> Result<(u64, u64), ExecutionError> {
    let a = machine.registers.read_raw(instr.register(0)?)?;
    let b = machine.registers.read_raw(instr.register(1)?)?;
    Ok((a, b))
}

/// Executes CMP: signed comparison of two registers.
pub(crate) fn execute_cmp(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let (a, b) = raw_operands(machine, instr)?;

    machine.registers.set_flags((a as i64).cmp(&(b as i64)).into());
    Ok(Flow::Next)
}

/// Executes CMPU: unsigned comparison of two registers.
pub(crate) fn execute_cmpu(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let (a, b) = raw_operands(machine, instr)?;

    machine.registers.set_flags(a.cmp(&b).into());
    Ok(Flow::Next)
}

/// Executes FCMP: `f64` comparison; NaN on either side gives `Unordered`.
pub(crate) fn execute_fcmp(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let (a, b) = raw_operands(machine, instr)?;

    let ordering = f64::from_bits(a).partial_cmp(&f64::from_bits(b));
    machine.registers.set_flags(CompareResult::from(ordering));
    Ok(Flow::Next)
}

/// Executes CMPI: signed comparison of a register with an immediate.
pub(crate) fn execute_cmpi(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let a = machine.registers.read_raw(instr.register(0)?)? as i64;
    let imm = instr.immediate(1)?;

    machine.registers.set_flags(a.cmp(&imm).into());
    Ok(Flow::Next)
}

#[cfg(test)]
mod tests {
    use crate::machine::Machine;
    use crate::registers::{CompareResult, Value};

    fn compare(program: &[u8], a: Value, b: Value) -> CompareResult {
        let mut machine = Machine::from_program(program).unwrap();
        machine.registers_mut().set(0, a).unwrap();
        machine.registers_mut().set(1, b).unwrap();
        machine.step();
        machine.flags()
    }

    #[test]
    fn test_signed_and_unsigned_disagree() {
        // CMP R0, R1 / CMPU R0, R1 with R0 = -1, R1 = 1
        assert_eq!(
            compare(&[0x30, 0x00, 0x01], Value::I64(-1), Value::I64(1)),
            CompareResult::Less
        );
        assert_eq!(
            compare(&[0x31, 0x00, 0x01], Value::I64(-1), Value::I64(1)),
            CompareResult::Greater
        );
    }

    #[test]
    fn test_fcmp_nan_is_unordered() {
        assert_eq!(
            compare(&[0x32, 0x00, 0x01], Value::F64(f64::NAN), Value::F64(1.0)),
            CompareResult::Unordered
        );
        assert_eq!(
            compare(&[0x32, 0x00, 0x01], Value::F64(-0.0), Value::F64(0.0)),
            CompareResult::Equal
        );
    }

    #[test]
    fn test_cmpi_sign_extends_immediate() {
        // CMPI R0, #-1
        let mut machine = Machine::from_program(&[0x33, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        machine.registers_mut().set(0, Value::I64(-1)).unwrap();
        machine.step();

        assert_eq!(machine.flags(), CompareResult::Equal);
    }
}
