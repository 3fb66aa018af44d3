//! Operand decoder and encoder tests
//!
//! Verifies that decoding follows the opcode table for every opcode, that
//! short input is reported as truncation, and that encoding agrees with
//! decoding.

use bytevm::{
    decode_instruction, encode, EncodeError, ExecutionError, Machine, Opcode, Operand,
    OperandType, Predicate, Status, Width, OPCODE_TABLE,
};

/// A valid operand for each type tag.
fn sample_operand(ty: OperandType) -> Operand {
    match ty {
        OperandType::Register => Operand::Register(7),
        OperandType::Address => Operand::Address(0x0123),
        OperandType::Size => Operand::Size(Width::Word),
        OperandType::Offset => Operand::Offset(-2),
        OperandType::Comparison => Operand::Comparison(Predicate::Ge),
        OperandType::Int8 => Operand::Immediate(-3),
        OperandType::Int16 => Operand::Immediate(-300),
        OperandType::Int32 => Operand::Immediate(-70_000),
    }
}

fn sample_encoding(opcode: Opcode) -> (Vec<Operand>, Vec<u8>) {
    let operands: Vec<Operand> = opcode
        .metadata()
        .operands
        .iter()
        .map(|&ty| sample_operand(ty))
        .collect();
    let bytes = encode(opcode, &operands).unwrap();
    (operands, bytes)
}

#[test]
fn test_every_opcode_decodes_its_encoding() {
    for metadata in OPCODE_TABLE.iter() {
        let (operands, bytes) = sample_encoding(metadata.opcode);
        assert_eq!(bytes.len(), metadata.size_bytes(), "{}", metadata.mnemonic);

        let instr = decode_instruction(&bytes, 0x0040).unwrap();
        assert_eq!(instr.opcode, metadata.opcode);
        assert_eq!(instr.operands, operands, "{}", metadata.mnemonic);
        assert_eq!(instr.size_bytes, bytes.len());
        assert_eq!(instr.address, 0x0040);
    }
}

#[test]
fn test_every_opcode_missing_last_byte_is_truncated() {
    for metadata in OPCODE_TABLE.iter() {
        let (_, bytes) = sample_encoding(metadata.opcode);
        let short = &bytes[..bytes.len() - 1];

        // Opcodes without operands lose their opcode byte too
        let opcode = (metadata.size_bytes() > 1).then_some(metadata.opcode as u8);
        let needed = if opcode.is_some() { metadata.size_bytes() } else { 1 };

        assert_eq!(
            decode_instruction(short, 0),
            Err(ExecutionError::TruncatedInstruction {
                opcode,
                needed,
                available: short.len(),
            }),
            "{}",
            metadata.mnemonic
        );
    }
}

#[test]
fn test_truncated_instruction_at_end_of_memory_faults() {
    let (_, bytes) = sample_encoding(Opcode::CmpI);
    let mut machine = Machine::new();
    let start = 1024 - (bytes.len() - 1);
    machine.load_program(start as u16, &bytes[..bytes.len() - 1]).unwrap();
    machine.set_pc(start as u16);

    assert!(matches!(
        machine.step(),
        Status::Faulted(ExecutionError::TruncatedInstruction { .. })
    ));
    assert_eq!(machine.steps(), 0);
}

#[test]
fn test_empty_input() {
    assert_eq!(
        decode_instruction(&[], 0x0010),
        Err(ExecutionError::TruncatedInstruction {
            opcode: None,
            needed: 1,
            available: 0,
        })
    );
}

#[test]
fn test_unknown_opcodes() {
    for byte in 0x3Eu8..=0xFF {
        assert_eq!(
            decode_instruction(&[byte, 0, 0, 0, 0, 0], 0),
            Err(ExecutionError::UnknownOpcode(byte))
        );
    }
}

#[test]
fn test_invalid_size_byte() {
    // LOAD R0, 16, $0000
    assert_eq!(
        decode_instruction(&[0x08, 0x00, 0x10, 0x00, 0x00], 0),
        Err(ExecutionError::InvalidSize(16))
    );
}

#[test]
fn test_registers_are_not_validated_by_decoder() {
    // Register indices are checked at execution, not decode
    let instr = decode_instruction(&[0x07, 0xEE], 0).unwrap();
    assert_eq!(instr.operands, vec![Operand::Register(0xEE)]);
}

#[test]
fn test_instruction_display() {
    let (_, bytes) = sample_encoding(Opcode::BrA);
    let instr = decode_instruction(&bytes, 0).unwrap();

    assert_eq!(instr.to_string(), "BRA GE, $0123");
}

#[test]
fn test_encode_errors() {
    assert!(matches!(
        encode(Opcode::Hlt, &[Operand::Register(0)]),
        Err(EncodeError::ArityMismatch { expected: 0, found: 1, .. })
    ));
    assert!(matches!(
        encode(Opcode::MovI16, &[Operand::Register(0), Operand::Immediate(70_000)]),
        Err(EncodeError::ImmediateOutOfRange { slot: 1, .. })
    ));
    assert!(matches!(
        encode(Opcode::Store, &[Operand::Register(0), Operand::Address(0), Operand::Register(1)]),
        Err(EncodeError::TypeMismatch { slot: 0, expected: OperandType::Size, .. })
    ));
}
