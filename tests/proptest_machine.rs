//! Property-based tests for machine invariants.
//!
//! These tests execute arbitrary byte sequences and verify that the machine
//! never panics, that faults are instruction-atomic and that terminal states
//! are sticky.

use bytevm::{decode_instruction, Machine, Snapshot, Status, MEMORY_SIZE};
use proptest::prelude::*;

/// Everything in a snapshot except the status, which a fault is allowed to change.
fn state_without_status(snapshot: &Snapshot) -> Snapshot {
    Snapshot {
        status: Status::Running,
        ..snapshot.clone()
    }
}

fn setup_machine(program: &[u8], registers: &[u64]) -> Machine {
    let mut machine = Machine::from_program(program).unwrap();
    for (i, &bits) in registers.iter().enumerate() {
        machine.registers_mut().write_raw(i as u8, bits).unwrap();
    }
    machine
}

proptest! {
    /// Property: a faulting step changes nothing but the status
    #[test]
    fn prop_faults_are_atomic(
        program in prop::collection::vec(any::<u8>(), 1..16),
        registers in prop::collection::vec(any::<u64>(), 16),
    ) {
        let mut machine = setup_machine(&program, &registers);
        let before = machine.snapshot();

        let status = machine.step();

        if let Status::Faulted(_) = status {
            prop_assert_eq!(state_without_status(&machine.snapshot()), state_without_status(&before));
            prop_assert!(machine.fault().is_some());
        } else {
            prop_assert_eq!(machine.steps(), 1);
        }
    }

    /// Property: a successful step commits PC inside memory (or exactly at its end)
    #[test]
    fn prop_pc_stays_in_range(
        program in prop::collection::vec(any::<u8>(), 1..64),
        registers in prop::collection::vec(any::<u64>(), 16),
    ) {
        let mut machine = setup_machine(&program, &registers);

        for _ in 0..64 {
            if machine.step().is_terminal() {
                break;
            }
            prop_assert!(machine.pc() as usize <= MEMORY_SIZE);
            prop_assert!(machine.sp() as usize <= MEMORY_SIZE);
        }
    }

    /// Property: stepping a halted or faulted machine never changes it
    #[test]
    fn prop_terminal_states_are_sticky(program in prop::collection::vec(any::<u8>(), 1..32)) {
        let mut machine = Machine::from_program(&program).unwrap();
        let outcome = machine.run(500);
        prop_assume!(outcome.status.is_terminal());

        let before = machine.snapshot();
        machine.step();
        machine.run(10);

        prop_assert_eq!(machine.snapshot(), before);
    }

    /// Property: the step counter matches the number of completed instructions
    #[test]
    fn prop_run_counts_steps(program in prop::collection::vec(any::<u8>(), 1..32), limit in 0u64..200) {
        let mut machine = Machine::from_program(&program).unwrap();

        let outcome = machine.run(limit);

        prop_assert!(outcome.steps <= limit);
        prop_assert_eq!(outcome.steps, machine.steps());
        if outcome.steps < limit {
            prop_assert!(outcome.status.is_terminal());
        }
    }

    /// Property: every decodable instruction re-encodes to its own bytes
    #[test]
    fn prop_decode_encode_round_trip(bytes in prop::collection::vec(any::<u8>(), 1..8)) {
        if let Ok(instr) = decode_instruction(&bytes, 0) {
            prop_assert_eq!(instr.encode(), bytes[..instr.size_bytes].to_vec());
        }
    }
}
