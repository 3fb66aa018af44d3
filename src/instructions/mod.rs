//! # Instruction Implementations
//!
//! This module contains the execution semantics of every opcode, organized by
//! category. Each handler takes the machine and the decoded instruction and
//! returns how control continues.
//!
//! Handlers validate everything (register indices, memory ranges, stack room,
//! divisors, jump targets) before the first mutation, so an `Err` always leaves
//! the machine untouched. PC and the step counter are committed by
//! [`Machine::step`] from the returned [`Flow`].
//!
//! ## Categories
//!
//! - **transfer**: MOVI8, MOVI16, MOVI32, MOV, SWAP, CLR, MOVLANE
//! - **load_store**: LOAD, LOADS, STORE, STI8, LOADR, STORER
//! - **alu**: ADD, SUB, MUL, DIV, MOD, DIVU, MODU, ADDI, ADDIW, MULI, INC, DEC,
//!   NEG, AND, OR, XOR, NOT, ANDI, ORI
//! - **shifts**: SHL, SHR, SAR, SHLI, SHRI, SEXT, ZEXT
//! - **float**: FADD, FSUB, FMUL, FDIV, ITOF, FTOI, FNARROW, FWIDEN
//! - **compare**: CMP, CMPU, FCMP, CMPI
//! - **control**: HLT, NOP, JMP, JMPA, BR, BRA, CALL, CALLA, RET
//! - **stack**: PUSH, POP

pub mod alu;
pub mod compare;
pub mod control;
pub mod float;
pub mod load_store;
pub mod shifts;
pub mod stack;
pub mod transfer;

use crate::decoder::Instruction;
use crate::machine::Machine;
use crate::opcodes::Opcode;
use crate::ExecutionError;

/// How execution continues after an instruction completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Fall through to the next instruction.
    Next,
    /// Continue at an already validated address.
    Jump(u16),
    /// Stop with status `Halted`.
    Halt,
}

/// Executes one decoded instruction.
///
/// The match is exhaustive over [`Opcode`]: adding an opcode to the table
/// without giving it semantics does not compile.
pub(crate) fn execute(machine: &mut Machine, instr: &Instruction) -> Result<Flow, ExecutionError> {
    use load_store::Extension;
    use shifts::Shift;

    match instr.opcode {
        Opcode::Hlt => Ok(Flow::Halt),
        Opcode::Nop => Ok(Flow::Next),

        Opcode::MovI8 | Opcode::MovI16 | Opcode::MovI32 => transfer::execute_movi(machine, instr),
        Opcode::Mov => transfer::execute_mov(machine, instr),
        Opcode::Swap => transfer::execute_swap(machine, instr),
        Opcode::Clr => transfer::execute_clr(machine, instr),
        Opcode::MovLane => transfer::execute_movlane(machine, instr),

        Opcode::Load => load_store::execute_load(machine, instr, Extension::Zero),
        Opcode::LoadS => load_store::execute_load(machine, instr, Extension::Sign),
        Opcode::Store => load_store::execute_store(machine, instr),
        Opcode::Sti8 => load_store::execute_sti8(machine, instr),
        Opcode::LoadR => load_store::execute_loadr(machine, instr),
        Opcode::StoreR => load_store::execute_storer(machine, instr),

        Opcode::Add => alu::execute_checked(machine, instr, i64::checked_add),
        Opcode::Sub => alu::execute_checked(machine, instr, i64::checked_sub),
        Opcode::Mul => alu::execute_checked(machine, instr, i64::checked_mul),
        Opcode::Div => alu::execute_signed_division(machine, instr, i64::checked_div),
        Opcode::Mod => alu::execute_signed_division(machine, instr, i64::checked_rem),
        Opcode::DivU => alu::execute_unsigned_division(machine, instr, |a, b| a / b),
        Opcode::ModU => alu::execute_unsigned_division(machine, instr, |a, b| a % b),
        Opcode::AddI | Opcode::AddIW => alu::execute_checked_immediate(machine, instr, i64::checked_add),
        Opcode::MulI => alu::execute_checked_immediate(machine, instr, i64::checked_mul),
        Opcode::Inc => alu::execute_checked_unary(machine, instr, |v| v.checked_add(1)),
        Opcode::Dec => alu::execute_checked_unary(machine, instr, |v| v.checked_sub(1)),
        Opcode::Neg => alu::execute_checked_unary(machine, instr, i64::checked_neg),
        Opcode::And => alu::execute_logic(machine, instr, |a, b| a & b),
        Opcode::Or => alu::execute_logic(machine, instr, |a, b| a | b),
        Opcode::Xor => alu::execute_logic(machine, instr, |a, b| a ^ b),
        Opcode::Not => alu::execute_not(machine, instr),
        Opcode::AndI => alu::execute_logic_immediate(machine, instr, |a, b| a & b),
        Opcode::OrI => alu::execute_logic_immediate(machine, instr, |a, b| a | b),

        Opcode::Shl => shifts::execute_shift(machine, instr, Shift::Left),
        Opcode::Shr => shifts::execute_shift(machine, instr, Shift::Logical),
        Opcode::Sar => shifts::execute_shift(machine, instr, Shift::Arithmetic),
        Opcode::ShlI => shifts::execute_shift_immediate(machine, instr, Shift::Left),
        Opcode::ShrI => shifts::execute_shift_immediate(machine, instr, Shift::Logical),
        Opcode::Sext => shifts::execute_extend(machine, instr, Extension::Sign),
        Opcode::Zext => shifts::execute_extend(machine, instr, Extension::Zero),

        Opcode::FAdd => float::execute_arithmetic(machine, instr, |a, b| a + b),
        Opcode::FSub => float::execute_arithmetic(machine, instr, |a, b| a - b),
        Opcode::FMul => float::execute_arithmetic(machine, instr, |a, b| a * b),
        Opcode::FDiv => float::execute_arithmetic(machine, instr, |a, b| a / b),
        Opcode::IToF => float::execute_itof(machine, instr),
        Opcode::FToI => float::execute_ftoi(machine, instr),
        Opcode::FNarrow => float::execute_fnarrow(machine, instr),
        Opcode::FWiden => float::execute_fwiden(machine, instr),

        Opcode::Cmp => compare::execute_cmp(machine, instr),
        Opcode::CmpU => compare::execute_cmpu(machine, instr),
        Opcode::FCmp => compare::execute_fcmp(machine, instr),
        Opcode::CmpI => compare::execute_cmpi(machine, instr),

        Opcode::Jmp => control::execute_jmp(instr),
        Opcode::JmpA => control::execute_jmpa(instr),
        Opcode::Br => control::execute_br(machine, instr),
        Opcode::BrA => control::execute_bra(machine, instr),
        Opcode::Call => control::execute_call(machine, instr),
        Opcode::CallA => control::execute_calla(machine, instr),
        Opcode::Ret => control::execute_ret(machine),

        Opcode::Push => stack::execute_push(machine, instr),
        Opcode::Pop => stack::execute_pop(machine, instr),
    }
}
