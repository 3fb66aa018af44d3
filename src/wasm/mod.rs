//! WebAssembly bindings for the bytecode machine.
//!
//! This module provides JavaScript-callable interfaces to [`Machine`](crate::Machine),
//! enabling browser-based debuggers that step programs and inspect state.

#[cfg(feature = "wasm")]
pub mod api;

#[cfg(feature = "wasm")]
pub use api::WasmMachine;
