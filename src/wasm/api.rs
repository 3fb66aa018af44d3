//! WASM API for the bytecode machine.
//!
//! Provides JavaScript-callable interfaces for machine control, state
//! inspection and disassembly.

use crate::{
    disassemble, format_item, DisassembledItem, DisassemblyOptions, Machine, MachineConfig,
    MEMORY_SIZE,
};
use wasm_bindgen::prelude::*;

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsError {
    message: String,
}

#[wasm_bindgen]
impl JsError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str) -> JsError {
        JsError {
            message: message.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

/// One line of a disassembly listing
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct DisassemblyLine {
    address: u16,
    bytes: Vec<u8>,
    text: String,
}

#[wasm_bindgen]
impl DisassemblyLine {
    #[wasm_bindgen(getter)]
    pub fn address(&self) -> u16 {
        self.address
    }

    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.text.clone()
    }
}

impl From<&DisassembledItem> for DisassemblyLine {
    fn from(item: &DisassembledItem) -> Self {
        DisassemblyLine {
            address: item.address(),
            bytes: item.bytes(),
            text: format_item(item),
        }
    }
}

/// Main machine interface for JavaScript
#[wasm_bindgen]
pub struct WasmMachine {
    machine: Machine,
}

#[wasm_bindgen]
impl WasmMachine {
    /// Create a machine with the default configuration
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        WasmMachine {
            machine: Machine::new(),
        }
    }

    /// Create a machine with a custom entry point and stack region
    pub fn with_config(entry_point: u16, stack_limit: u16, stack_top: u16) -> Result<WasmMachine, JsError> {
        let config = MachineConfig::default()
            .with_entry_point(entry_point)
            .with_stack(stack_limit, stack_top);

        Machine::with_config(config)
            .map(|machine| WasmMachine { machine })
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Load a program into memory and set PC to its first byte
    pub fn load_program(&mut self, program: &[u8], start_addr: u16) -> Result<(), JsError> {
        self.machine
            .load_program(start_addr, program)
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.machine.set_pc(start_addr);
        Ok(())
    }

    /// Execute a single instruction and return the status text
    pub fn step(&mut self) -> String {
        self.machine.step().to_string()
    }

    /// Execute up to `max_steps` instructions and return how many completed
    pub fn run(&mut self, max_steps: u32) -> u32 {
        self.machine.run(max_steps as u64).steps as u32
    }

    /// Restore registers, PC, SP and status; memory is kept
    pub fn reset(&mut self) {
        self.machine.reset();
    }

    #[wasm_bindgen(getter)]
    pub fn pc(&self) -> u16 {
        self.machine.pc()
    }

    #[wasm_bindgen(getter)]
    pub fn sp(&self) -> u16 {
        self.machine.sp()
    }

    #[wasm_bindgen(getter)]
    pub fn steps(&self) -> f64 {
        self.machine.steps() as f64 // Convert u64 to f64 for JavaScript
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        !self.machine.status().is_terminal()
    }

    /// Status text: "running", "halted" or "faulted: <reason>"
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        self.machine.status().to_string()
    }

    /// Full fault report, if the machine has faulted
    #[wasm_bindgen(getter)]
    pub fn fault(&self) -> Option<String> {
        self.machine.fault().map(|report| report.to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn flags(&self) -> String {
        format!("{:?}", self.machine.flags())
    }

    /// Raw register slots as a `BigUint64Array`
    pub fn registers(&self) -> js_sys::BigUint64Array {
        js_sys::BigUint64Array::from(&self.machine.registers().raw()[..])
    }

    /// Set a register's raw bits
    pub fn set_register(&mut self, index: u8, bits: u64) -> Result<(), JsError> {
        self.machine
            .registers_mut()
            .write_raw(index, bits)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// The whole address space as a `Uint8Array`
    pub fn memory(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(&self.machine.memory().as_bytes()[..])
    }

    /// Set the program counter
    pub fn set_pc(&mut self, addr: u16) {
        self.machine.set_pc(addr);
    }

    /// Disassemble memory starting at an address
    pub fn disassemble(&self, start_addr: u16, num_instructions: u32) -> Vec<JsValue> {
        let start = (start_addr as usize).min(MEMORY_SIZE);
        let opts = DisassemblyOptions {
            start_address: start_addr,
            hex_dump: false,
        };

        disassemble(&self.machine.memory().as_bytes()[start..], opts)
            .iter()
            .take(num_instructions as usize)
            .map(|item| JsValue::from(DisassemblyLine::from(item)))
            .collect()
    }
}

impl Default for WasmMachine {
    fn default() -> Self {
        Self::new()
    }
}
