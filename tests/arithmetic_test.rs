//! Tests for integer, logical, shift and float instructions.
//!
//! Tests cover:
//! - Checked signed arithmetic and its overflow faults
//! - Division and remainder edge cases
//! - Immediate forms and their sign extension
//! - Shifts, extensions and float conversions

use bytevm::{encode, ExecutionError, Machine, Opcode, Operand, ScalarType, Status, Value};

/// Runs one two-register instruction `op R0, R1` with the given inputs.
fn run_binary(opcode: Opcode, r0: Value, r1: Value) -> Machine {
    let code = encode(opcode, &[Operand::Register(0), Operand::Register(1)]).unwrap();
    let mut machine = Machine::from_program(&code).unwrap();
    machine.registers_mut().set(0, r0).unwrap();
    machine.registers_mut().set(1, r1).unwrap();
    machine.step();
    machine
}

/// Runs one `op R0, #imm` instruction.
fn run_immediate(opcode: Opcode, r0: i64, imm: i64) -> Machine {
    let code = encode(opcode, &[Operand::Register(0), Operand::Immediate(imm)]).unwrap();
    let mut machine = Machine::from_program(&code).unwrap();
    machine.registers_mut().set(0, Value::I64(r0)).unwrap();
    machine.step();
    machine
}

/// Runs one `op R0` instruction.
fn run_unary(opcode: Opcode, r0: Value) -> Machine {
    let code = encode(opcode, &[Operand::Register(0)]).unwrap();
    let mut machine = Machine::from_program(&code).unwrap();
    machine.registers_mut().set(0, r0).unwrap();
    machine.step();
    machine
}

fn r0_i64(machine: &Machine) -> i64 {
    machine.registers().read_raw(0).unwrap() as i64
}

// ========== Signed Arithmetic ==========

#[test]
fn test_add_sub_mul() {
    assert_eq!(r0_i64(&run_binary(Opcode::Add, Value::I64(40), Value::I64(2))), 42);
    assert_eq!(r0_i64(&run_binary(Opcode::Sub, Value::I64(-40), Value::I64(2))), -42);
    assert_eq!(r0_i64(&run_binary(Opcode::Mul, Value::I64(-6), Value::I64(7))), -42);
}

#[test]
fn test_overflow_faults_leave_destination() {
    let cases = [
        (Opcode::Add, i64::MAX, 1),
        (Opcode::Sub, i64::MIN, 1),
        (Opcode::Mul, i64::MAX / 2 + 1, 2),
    ];

    for (opcode, a, b) in cases {
        let machine = run_binary(opcode, Value::I64(a), Value::I64(b));

        assert_eq!(
            machine.status(),
            Status::Faulted(ExecutionError::ArithmeticOverflow),
            "{opcode:?}"
        );
        assert_eq!(r0_i64(&machine), a, "{opcode:?} must not write R0");
    }
}

#[test]
fn test_inc_dec_neg() {
    assert_eq!(r0_i64(&run_unary(Opcode::Inc, Value::I64(-1))), 0);
    assert_eq!(r0_i64(&run_unary(Opcode::Dec, Value::I64(0))), -1);
    assert_eq!(r0_i64(&run_unary(Opcode::Neg, Value::I64(5))), -5);

    assert_eq!(
        run_unary(Opcode::Inc, Value::I64(i64::MAX)).status(),
        Status::Faulted(ExecutionError::ArithmeticOverflow)
    );
    assert_eq!(
        run_unary(Opcode::Neg, Value::I64(i64::MIN)).status(),
        Status::Faulted(ExecutionError::ArithmeticOverflow)
    );
}

// ========== Division ==========

#[test]
fn test_div_truncates_toward_zero() {
    assert_eq!(r0_i64(&run_binary(Opcode::Div, Value::I64(-7), Value::I64(2))), -3);
    assert_eq!(r0_i64(&run_binary(Opcode::Mod, Value::I64(7), Value::I64(-2))), 1);
}

#[test]
fn test_division_by_zero() {
    for opcode in [Opcode::Div, Opcode::Mod, Opcode::DivU, Opcode::ModU] {
        let machine = run_binary(opcode, Value::I64(1), Value::I64(0));

        assert_eq!(
            machine.status(),
            Status::Faulted(ExecutionError::DivisionByZero),
            "{opcode:?}"
        );
    }
}

#[test]
fn test_min_mod_minus_one_overflows() {
    let machine = run_binary(Opcode::Mod, Value::I64(i64::MIN), Value::I64(-1));

    assert_eq!(machine.status(), Status::Faulted(ExecutionError::ArithmeticOverflow));
}

#[test]
fn test_unsigned_division() {
    let machine = run_binary(Opcode::ModU, Value::U64(u64::MAX), Value::U64(10));
    assert_eq!(machine.registers().read_raw(0).unwrap(), u64::MAX % 10);
}

// ========== Immediates ==========

#[test]
fn test_addi_negative_immediate() {
    assert_eq!(r0_i64(&run_immediate(Opcode::AddI, 10, -20)), -10);
    assert_eq!(r0_i64(&run_immediate(Opcode::AddIW, 0, -30000)), -30000);
}

#[test]
fn test_muli_overflow() {
    let machine = run_immediate(Opcode::MulI, i64::MAX / 1000, 1001);
    assert_eq!(machine.status(), Status::Faulted(ExecutionError::ArithmeticOverflow));
}

#[test]
fn test_movi32_negative() {
    let code = encode(Opcode::MovI32, &[Operand::Register(4), Operand::Immediate(-100_000)]).unwrap();
    let mut machine = Machine::from_program(&code).unwrap();
    machine.step();

    assert_eq!(
        machine.registers().get(4, ScalarType::I64).unwrap(),
        Value::I64(-100_000)
    );
}

// ========== Logic and Shifts ==========

#[test]
fn test_logic_ops() {
    let a = Value::U64(0b1100);
    let b = Value::U64(0b1010);

    assert_eq!(run_binary(Opcode::And, a, b).registers().read_raw(0).unwrap(), 0b1000);
    assert_eq!(run_binary(Opcode::Or, a, b).registers().read_raw(0).unwrap(), 0b1110);
    assert_eq!(run_binary(Opcode::Xor, a, b).registers().read_raw(0).unwrap(), 0b0110);
    assert_eq!(run_unary(Opcode::Not, a).registers().read_raw(0).unwrap(), !0b1100);
}

#[test]
fn test_ori_immediate() {
    let machine = run_immediate(Opcode::OrI, 0x1_0000, 0x00FF);
    assert_eq!(r0_i64(&machine), 0x1_00FF);
}

#[test]
fn test_shift_by_register() {
    let neg = Value::I64(-16);

    assert_eq!(run_binary(Opcode::Shl, Value::U64(3), Value::U64(4)).registers().read_raw(0).unwrap(), 48);
    assert_eq!(r0_i64(&run_binary(Opcode::Sar, neg, Value::U64(2))), -4);
    assert_eq!(
        run_binary(Opcode::Shr, neg, Value::U64(60)).registers().read_raw(0).unwrap(),
        0xF
    );
    assert_eq!(r0_i64(&run_binary(Opcode::Sar, neg, Value::U64(64))), -1);
    assert_eq!(r0_i64(&run_binary(Opcode::Shl, Value::U64(1), Value::U64(64))), 0);
}

#[test]
fn test_shift_immediate() {
    assert_eq!(r0_i64(&run_immediate(Opcode::ShlI, 1, 10)), 1024);
    assert_eq!(r0_i64(&run_immediate(Opcode::ShrI, 1024, 3)), 128);
}

#[test]
fn test_zext_truncates() {
    let code = encode(
        Opcode::Zext,
        &[Operand::Register(0), Operand::Size(bytevm::Width::Half)],
    )
    .unwrap();
    let mut machine = Machine::from_program(&code).unwrap();
    machine.registers_mut().write_raw(0, 0xDEAD_BEEF).unwrap();
    machine.step();

    assert_eq!(machine.registers().read_raw(0).unwrap(), 0xBEEF);
}

// ========== Floats ==========

#[test]
fn test_float_arithmetic() {
    let get = |m: Machine| m.registers().get(0, ScalarType::F64).unwrap();

    assert_eq!(get(run_binary(Opcode::FAdd, Value::F64(1.5), Value::F64(2.25))), Value::F64(3.75));
    assert_eq!(get(run_binary(Opcode::FSub, Value::F64(1.5), Value::F64(2.25))), Value::F64(-0.75));
    assert_eq!(get(run_binary(Opcode::FMul, Value::F64(1.5), Value::F64(-2.0))), Value::F64(-3.0));
    assert_eq!(get(run_binary(Opcode::FDiv, Value::F64(1.0), Value::F64(4.0))), Value::F64(0.25));
}

#[test]
fn test_fdiv_zero_by_zero_is_nan() {
    let machine = run_binary(Opcode::FDiv, Value::F64(0.0), Value::F64(0.0));

    assert_eq!(machine.status(), Status::Running);
    match machine.registers().get(0, ScalarType::F64).unwrap() {
        Value::F64(v) => assert!(v.is_nan()),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_itof_then_ftoi() {
    let machine = run_binary(Opcode::IToF, Value::I64(0), Value::I64(-12));
    assert_eq!(machine.registers().get(0, ScalarType::F64).unwrap(), Value::F64(-12.0));

    let machine = run_binary(Opcode::FToI, Value::I64(0), Value::F64(12.99));
    assert_eq!(r0_i64(&machine), 12);
}

#[test]
fn test_ftoi_boundaries() {
    let machine = run_binary(Opcode::FToI, Value::I64(0), Value::F64(-9_223_372_036_854_775_808.0));
    assert_eq!(r0_i64(&machine), i64::MIN);

    let machine = run_binary(Opcode::FToI, Value::I64(0), Value::F64(9_223_372_036_854_775_808.0));
    assert_eq!(machine.status(), Status::Faulted(ExecutionError::ArithmeticOverflow));

    let machine = run_binary(Opcode::FToI, Value::I64(0), Value::F64(f64::NEG_INFINITY));
    assert_eq!(machine.status(), Status::Faulted(ExecutionError::ArithmeticOverflow));
}
