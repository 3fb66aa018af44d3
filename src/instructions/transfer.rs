//! # Register Transfer Instructions
//!
//! - MOVI8 / MOVI16 / MOVI32: load a sign-extended immediate
//! - MOV: copy one register to another
//! - SWAP: exchange two registers
//! - CLR: zero a register
//! - MOVLANE: overwrite one 16-bit lane of a register, keeping the others

use super::Flow;
use crate::decoder::Instruction;
use crate::machine::Machine;
use crate::ExecutionError;

/// Executes MOVI8, MOVI16 and MOVI32.
///
/// The decoder has already sign-extended the immediate to 64 bits, so
/// `MOVI8 R0, #-1` leaves all 64 bits of R0 set.
pub(crate) fn execute_movi(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let value = instr.immediate(1)?;

    machine.registers.write_raw(dst, value as u64)?;
    Ok(Flow::Next)
}

/// Executes MOV: `dst <- src`.
pub(crate) fn execute_mov(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let src = instr.register(1)?;

    let value = machine.registers.read_raw(src)?;
    machine.registers.write_raw(dst, value)?;
    Ok(Flow::Next)
}

/// Executes SWAP. Swapping a register with itself is a no-op.
pub(crate) fn execute_swap(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let a = instr.register(0)?;
    let b = instr.register(1)?;

    let va = machine.registers.read_raw(a)?;
    let vb = machine.registers.read_raw(b)?;
    machine.registers.write_raw(a, vb)?;
    machine.registers.write_raw(b, va)?;
    Ok(Flow::Next)
}

/// Executes CLR.
pub(crate) fn execute_clr(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    machine.registers.write_raw(instr.register(0)?, 0)?;
    Ok(Flow::Next)
}

/// Number of 16-bit lanes in a register.
const LANES: i64 = 4;

/// Executes MOVLANE: replaces bits `16 * lane .. 16 * lane + 16` of `dst`
/// with the low 16 bits of the immediate.
///
/// Four MOVLANE instructions build any 64-bit constant.
pub(crate) fn execute_movlane(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    let dst = instr.register(0)?;
    let lane = instr.immediate(1)?;
    let value = instr.immediate(2)? as u16 as u64;

    if !(0..LANES).contains(&lane) {
        return Err(ExecutionError::InvalidLane(lane));
    }
    let shift = 16 * lane as u32;

    let old = machine.registers.read_raw(dst)?;
    machine
        .registers
        .write_raw(dst, (old & !(0xFFFF << shift)) | (value << shift))?;
    Ok(Flow::Next)
}

#[cfg(test)]
mod tests {
    use crate::machine::{Machine, Status};
    use crate::ExecutionError;

    #[test]
    fn test_movi8_sign_extends() {
        // MOVI8 R0, #-1 ; HLT
        let mut machine = Machine::from_program(&[0x02, 0x00, 0xFF, 0x00]).unwrap();
        machine.run_to_completion();

        assert_eq!(machine.registers().read_raw(0).unwrap(), u64::MAX);
    }

    #[test]
    fn test_swap_with_invalid_register_is_atomic() {
        // SWAP R1, R16
        let mut machine = Machine::from_program(&[0x06, 0x01, 0x10]).unwrap();
        machine.registers_mut().write_raw(1, 42).unwrap();

        assert!(matches!(machine.step(), Status::Faulted(_)));
        assert_eq!(machine.registers().read_raw(1).unwrap(), 42);
        assert_eq!(machine.pc(), 0);
    }

    #[test]
    fn test_movlane_keeps_other_lanes() {
        // MOVLANE R2, 1, #0xBEEF
        let mut machine = Machine::from_program(&[0x3D, 0x02, 0x01, 0xEF, 0xBE]).unwrap();
        machine.registers_mut().write_raw(2, 0x1111_2222_3333_4444).unwrap();

        assert_eq!(machine.step(), Status::Running);
        assert_eq!(machine.registers().read_raw(2).unwrap(), 0x1111_2222_BEEF_4444);
    }

    #[test]
    fn test_movlane_rejects_lane_four() {
        // MOVLANE R0, 4, #1
        let mut machine = Machine::from_program(&[0x3D, 0x00, 0x04, 0x01, 0x00]).unwrap();
        machine.registers_mut().write_raw(0, 7).unwrap();

        assert_eq!(machine.step(), Status::Faulted(ExecutionError::InvalidLane(4)));
        assert_eq!(machine.registers().read_raw(0).unwrap(), 7);
        assert_eq!(machine.pc(), 0);
    }
}
