//! Fuzz target for machine execution.
//!
//! This target creates arbitrary register contents, memory images and entry
//! points, then runs a bounded number of instructions to find panics and
//! violations of fault atomicity.

#![no_main]

use arbitrary::Arbitrary;
use bytevm::{Machine, MachineConfig, Status, MEMORY_SIZE};
use libfuzzer_sys::fuzz_target;

/// Arbitrary machine initial state for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzMachineState {
    /// Raw register contents
    registers: [u64; 16],
    /// Initial program counter (reduced modulo memory size)
    entry_point: u16,
    /// Number of stack slots below the top of memory
    stack_slots: u8,
}

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    state: FuzzMachineState,
    /// Bytes loaded at address 0
    program: Vec<u8>,
    /// Step ceiling
    max_steps: u16,
}

fuzz_target!(|input: FuzzInput| {
    let stack_bytes = (input.state.stack_slots as u16 % 64) * 8;
    let config = MachineConfig::default()
        .with_entry_point(input.state.entry_point % MEMORY_SIZE as u16)
        .with_stack(MEMORY_SIZE as u16 - stack_bytes, MEMORY_SIZE as u16);

    let mut machine = match Machine::with_config(config) {
        Ok(machine) => machine,
        Err(e) => panic!("generated config rejected: {e}"),
    };

    let len = input.program.len().min(MEMORY_SIZE);
    machine.load_program(0, &input.program[..len]).unwrap();
    for (i, &bits) in input.state.registers.iter().enumerate() {
        machine.registers_mut().write_raw(i as u8, bits).unwrap();
    }

    for _ in 0..input.max_steps {
        let before = machine.snapshot();
        match machine.step() {
            Status::Faulted(_) => {
                // Nothing but the status may change on a fault
                let after = machine.snapshot();
                assert_eq!(after.registers, before.registers);
                assert_eq!(after.memory, before.memory);
                assert_eq!(after.pc, before.pc);
                assert_eq!(after.sp, before.sp);
                assert_eq!(after.flags, before.flags);
                assert_eq!(after.steps, before.steps);
                break;
            }
            Status::Halted => break,
            Status::Running => {
                assert_eq!(machine.steps(), before.steps + 1);
            }
        }
    }

    // Terminal states are sticky
    let before = machine.snapshot();
    if before.status.is_terminal() {
        machine.step();
        assert_eq!(machine.snapshot(), before);
    }
});
