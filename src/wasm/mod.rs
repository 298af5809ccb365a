//! WebAssembly bindings for the emulator.
//!
//! Exposes an `Emulator` class to JavaScript so a browser page can load a
//! program, run it under a step budget and inspect registers and memory.

pub mod api;

pub use api::{Emulator, RunResult};
