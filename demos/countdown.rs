//! Countdown example
//!
//! Demonstrates building, loading and stepping a small program.
//!
//! This example shows:
//! - Encoding instructions with `encode`
//! - Printing a disassembly listing
//! - Stepping the machine and inspecting registers and flags
//! - Reading a fault report

use bytevm::{
    disassemble, encode, format_listing, DisassemblyOptions, EncodeError, Machine, Opcode,
    Operand, Predicate, Status, Width,
};

/// Sums 5 + 4 + 3 + 2 + 1 into R1, stores it at $0100 and halts.
fn countdown_program() -> Result<Vec<u8>, EncodeError> {
    let instructions: [(Opcode, &[Operand]); 7] = [
        (Opcode::MovI8, &[Operand::Register(0), Operand::Immediate(5)]),
        // loop:
        (Opcode::Add, &[Operand::Register(1), Operand::Register(0)]),
        (Opcode::Dec, &[Operand::Register(0)]),
        (Opcode::CmpI, &[Operand::Register(0), Operand::Immediate(0)]),
        (Opcode::Br, &[Operand::Comparison(Predicate::Gt), Operand::Offset(-15)]),
        (
            Opcode::Store,
            &[Operand::Size(Width::Word), Operand::Address(0x0100), Operand::Register(1)],
        ),
        (Opcode::Hlt, &[]),
    ];

    let mut program = Vec::new();
    for (opcode, operands) in instructions {
        program.extend(encode(opcode, operands)?);
    }
    Ok(program)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("bytevm - Countdown Example");
    println!("==========================\n");

    let program = countdown_program()?;
    let options = DisassemblyOptions {
        start_address: 0x0000,
        hex_dump: true,
    };
    println!("Program ({} bytes):", program.len());
    print!("{}", format_listing(&disassemble(&program, options), options));
    println!();

    let mut machine = Machine::from_program(&program)?;

    println!("Execution trace:");
    println!("----------------");
    while machine.status() == Status::Running {
        let pc_before = machine.pc();
        machine.step();
        println!(
            "  ${:04X} -> ${:04X}  R0={:<3} R1={:<3} flags={:?}",
            pc_before,
            machine.pc(),
            machine.registers().read_raw(0)?,
            machine.registers().read_raw(1)?,
            machine.flags()
        );
    }

    println!("\nFinal state:");
    println!("------------");
    println!("  Status: {}", machine.status());
    println!("  Steps:  {}", machine.steps());
    println!("  mem[$0100] = {}", machine.memory().read(0x0100, Width::Word)?);

    // POP on an empty stack underflows
    println!("\nFault report example:");
    println!("---------------------");
    let mut faulty = Machine::from_program(&encode(Opcode::Pop, &[Operand::Register(1)])?)?;
    faulty.step();
    if let Some(report) = faulty.fault() {
        println!("  {}", report);
    }

    Ok(())
}
