//! # Machine State and Execution
//!
//! This module contains the [`Machine`] struct representing the complete
//! interpreter state and the fetch-decode-execute loop.
//!
//! ## Machine State
//!
//! The machine maintains:
//! - **Memory**: 1024 bytes, little-endian
//! - **Registers**: `R0..R15`, untyped 64-bit slots
//! - **Flags**: outcome of the most recent comparison
//! - **Program counter** (PC): address of the next instruction
//! - **Stack pointer** (SP): top of a downward-growing stack of 8-byte slots
//! - **Status**: `Running`, `Halted` or `Faulted(reason)`
//! - **Step counter**: number of instructions completed
//!
//! ## Execution Model
//!
//! - `step()`: execute one instruction
//! - `run(max_steps)`: execute until stopped or the step ceiling is reached
//! - `run_to_completion()`: execute until halted or faulted
//!
//! Instructions are atomic: a faulting instruction leaves every part of the
//! state exactly as it was after the previous instruction, and records a
//! [`FaultReport`] for diagnostics.

use crate::decoder::{decode_instruction, Instruction};
use crate::instructions::{self, Flow};
use crate::memory::{Memory, MEMORY_SIZE};
use crate::registers::{CompareResult, RegisterFile, REGISTER_COUNT};
use crate::ExecutionError;
use std::fmt;
use thiserror::Error;

/// Size of one stack slot in bytes.
pub const STACK_SLOT_BYTES: u16 = 8;

/// Execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The machine will execute the instruction at PC on the next step.
    Running,
    /// A HLT instruction completed.
    Halted,
    /// An instruction faulted. The machine must be reset before running again.
    Faulted(ExecutionError),
}

impl Status {
    /// Returns true once the machine has halted or faulted.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Running)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Running => f.write_str("running"),
            Status::Halted => f.write_str("halted"),
            Status::Faulted(error) => write!(f, "faulted: {error}"),
        }
    }
}

/// Configuration errors reported by [`Machine::with_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("entry point {0:#06X} is outside memory")]
    EntryPointOutOfBounds(u16),

    #[error("stack region {limit:#06X}..{top:#06X} is not inside memory")]
    InvalidStackRegion { limit: u16, top: u16 },

    #[error("stack region {limit:#06X}..{top:#06X} is not a whole number of 8-byte slots")]
    MisalignedStack { limit: u16, top: u16 },
}

/// Machine configuration.
///
/// # Examples
///
/// ```
/// use bytevm::{Machine, MachineConfig};
///
/// let config = MachineConfig::default()
///     .with_entry_point(0x0010)
///     .with_stack(0x0200, 0x0400);
///
/// let machine = Machine::with_config(config).unwrap();
/// assert_eq!(machine.pc(), 0x0010);
/// assert_eq!(machine.sp(), 0x0400);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Initial program counter.
    pub entry_point: u16,

    /// One past the highest stack byte; the initial stack pointer.
    pub stack_top: u16,

    /// Lowest byte the stack may occupy.
    pub stack_limit: u16,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            entry_point: 0x0000,
            stack_top: MEMORY_SIZE as u16,
            stack_limit: (MEMORY_SIZE - MEMORY_SIZE / 4) as u16,
        }
    }
}

impl MachineConfig {
    /// Sets the initial program counter.
    pub fn with_entry_point(mut self, entry_point: u16) -> Self {
        self.entry_point = entry_point;
        self
    }

    /// Sets the stack region to `limit..top`.
    pub fn with_stack(mut self, limit: u16, top: u16) -> Self {
        self.stack_limit = limit;
        self.stack_top = top;
        self
    }

    /// Checks the configuration against the address space.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entry_point as usize >= MEMORY_SIZE {
            return Err(ConfigError::EntryPointOutOfBounds(self.entry_point));
        }
        if self.stack_limit > self.stack_top || self.stack_top as usize > MEMORY_SIZE {
            return Err(ConfigError::InvalidStackRegion {
                limit: self.stack_limit,
                top: self.stack_top,
            });
        }
        if (self.stack_top - self.stack_limit) % STACK_SLOT_BYTES != 0 {
            return Err(ConfigError::MisalignedStack {
                limit: self.stack_limit,
                top: self.stack_top,
            });
        }
        Ok(())
    }
}

/// Everything a caller needs to explain a fault.
///
/// Recorded by the machine when an instruction faults and available from
/// [`Machine::fault`] until the next [`Machine::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultReport {
    /// What went wrong.
    pub error: ExecutionError,

    /// Program counter of the faulting instruction.
    pub pc: u16,

    /// Opcode byte at `pc`, if `pc` was inside memory.
    pub opcode: Option<u8>,

    /// The decoded instruction, if decoding succeeded.
    pub instruction: Option<Instruction>,
}

impl fmt::Display for FaultReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fault at ${:04X}: {}", self.pc, self.error)?;
        match (&self.instruction, self.opcode) {
            (Some(instruction), _) => write!(f, " [{instruction}]"),
            (None, Some(opcode)) => write!(f, " [opcode 0x{opcode:02X}]"),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for FaultReport {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Result of [`Machine::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Status after the last executed step.
    pub status: Status,

    /// Instructions completed during this run.
    pub steps: u64,
}

/// An owned copy of the complete machine state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub registers: [u64; REGISTER_COUNT],
    pub flags: CompareResult,
    pub pc: u16,
    pub sp: u16,
    pub status: Status,
    pub steps: u64,
    pub memory: Memory,
}

/// Interpreter state and execution context.
///
/// A machine owns its memory and registers exclusively; independent machines
/// share nothing and can run on separate threads.
///
/// # Examples
///
/// ```
/// use bytevm::{Machine, Status};
///
/// // MOVI8 R0, #7 ; INC R0 ; HLT
/// let mut machine = Machine::from_program(&[0x02, 0x00, 0x07, 0x18, 0x00, 0x00]).unwrap();
///
/// assert_eq!(machine.step(), Status::Running);
/// assert_eq!(machine.pc(), 3);
///
/// assert_eq!(machine.run_to_completion(), Status::Halted);
/// assert_eq!(machine.registers().read_raw(0).unwrap(), 8);
/// assert_eq!(machine.steps(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Machine {
    /// Address space
    pub(crate) memory: Memory,

    /// General-purpose registers and flags
    pub(crate) registers: RegisterFile,

    /// Program counter (address of next instruction)
    pub(crate) pc: u16,

    /// Stack pointer (address of the most recently pushed slot)
    pub(crate) sp: u16,

    pub(crate) status: Status,

    /// Instructions completed since construction or reset
    pub(crate) steps: u64,

    pub(crate) fault: Option<FaultReport>,

    pub(crate) config: MachineConfig,
}

impl Machine {
    /// Creates a machine with the default configuration and zeroed memory.
    pub fn new() -> Self {
        let config = MachineConfig::default();
        Self {
            memory: Memory::new(),
            registers: RegisterFile::new(),
            pc: config.entry_point,
            sp: config.stack_top,
            status: Status::Running,
            steps: 0,
            fault: None,
            config,
        }
    }

    /// Creates a machine with a custom configuration.
    pub fn with_config(config: MachineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut machine = Self::new();
        machine.config = config;
        machine.reset();
        Ok(machine)
    }

    /// Creates a default machine with `program` loaded at address 0.
    pub fn from_program(program: &[u8]) -> Result<Self, ExecutionError> {
        let mut machine = Self::new();
        machine.load_program(0, program)?;
        Ok(machine)
    }

    /// Copies `program` into memory at `address`.
    ///
    /// The program counter is not changed. Nothing is written if the program
    /// does not fit.
    pub fn load_program(&mut self, address: u16, program: &[u8]) -> Result<(), ExecutionError> {
        self.memory.load(address as usize, program)
    }

    /// Restores registers, flags, PC, SP, status and the step counter to their
    /// configured initial values and clears any fault. Memory is kept so a
    /// loaded program can run again.
    pub fn reset(&mut self) {
        self.registers = RegisterFile::new();
        self.pc = self.config.entry_point;
        self.sp = self.config.stack_top;
        self.status = Status::Running;
        self.steps = 0;
        self.fault = None;
    }

    /// Executes one instruction and returns the resulting status.
    ///
    /// Performs the fetch-decode-execute cycle:
    /// 1. Fetch the opcode byte at PC and look it up in the opcode table
    /// 2. Decode the operands that follow it
    /// 3. Execute the instruction's effect
    /// 4. Commit the new PC and count the step
    ///
    /// Any error moves the machine to [`Status::Faulted`] with the state left
    /// as it was before this step. On a halted or faulted machine this is a
    /// no-op that returns the current status.
    pub fn step(&mut self) -> Status {
        if self.status.is_terminal() {
            return self.status;
        }

        let pc = self.pc;
        let instruction = match self.fetch(pc) {
            Ok(instruction) => instruction,
            Err(error) => {
                let opcode = self.memory.as_bytes().get(pc as usize).copied();
                self.raise(error, opcode, None);
                return self.status;
            }
        };

        match instructions::execute(self, &instruction) {
            Ok(flow) => {
                let next = instruction.next_address() as u16;
                match flow {
                    Flow::Next => self.pc = next,
                    Flow::Jump(target) => self.pc = target,
                    Flow::Halt => {
                        self.pc = next;
                        self.status = Status::Halted;
                    }
                }
                self.steps += 1;
            }
            Err(error) => {
                let opcode = Some(instruction.opcode as u8);
                self.raise(error, opcode, Some(instruction));
            }
        }

        self.status
    }

    /// Fetches and decodes the instruction at `pc`, bounded by the end of memory.
    fn fetch(&self, pc: u16) -> Result<Instruction, ExecutionError> {
        let start = pc as usize;
        if start >= MEMORY_SIZE {
            return Err(ExecutionError::OutOfBounds {
                address: start as u64,
                width: 1,
            });
        }
        decode_instruction(&self.memory.as_bytes()[start..], pc)
    }

    fn raise(&mut self, error: ExecutionError, opcode: Option<u8>, instruction: Option<Instruction>) {
        self.status = Status::Faulted(error);
        self.fault = Some(FaultReport {
            error,
            pc: self.pc,
            opcode,
            instruction,
        });
    }

    /// Runs until the machine halts or faults, or `max_steps` instructions
    /// have completed.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytevm::{Machine, Status};
    ///
    /// // JMP -3: an infinite loop
    /// let mut machine = Machine::from_program(&[0x34, 0xFD, 0xFF]).unwrap();
    ///
    /// let outcome = machine.run(100);
    /// assert_eq!(outcome.status, Status::Running);
    /// assert_eq!(outcome.steps, 100);
    /// ```
    pub fn run(&mut self, max_steps: u64) -> RunOutcome {
        let start = self.steps;
        while self.steps - start < max_steps {
            if self.step().is_terminal() {
                break;
            }
        }
        RunOutcome {
            status: self.status,
            steps: self.steps - start,
        }
    }

    /// Runs until the machine halts or faults.
    ///
    /// Does not return if the program loops forever; use [`Machine::run`]
    /// to bound execution.
    pub fn run_to_completion(&mut self) -> Status {
        while !self.step().is_terminal() {}
        self.status
    }

    /// Returns an owned copy of the complete machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            registers: *self.registers.raw(),
            flags: self.registers.flags(),
            pc: self.pc,
            sp: self.sp,
            status: self.status,
            steps: self.steps,
            memory: self.memory.clone(),
        }
    }

    // ========== Inspection ==========

    /// Returns the program counter.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Returns the stack pointer.
    ///
    /// Equal to the configured stack top when the stack is empty.
    pub fn sp(&self) -> u16 {
        self.sp
    }

    /// Returns the execution status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns the number of instructions completed since construction or reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Returns the flags register.
    pub fn flags(&self) -> CompareResult {
        self.registers.flags()
    }

    /// Returns the fault report if the machine is faulted.
    pub fn fault(&self) -> Option<&FaultReport> {
        self.fault.as_ref()
    }

    /// Returns the register file.
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Returns the register file for setting up initial contents.
    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    /// Returns the memory.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Returns the memory for setting up initial contents.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Sets the program counter.
    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
