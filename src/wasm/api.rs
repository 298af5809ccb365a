//! WASM API for the emulator.
//!
//! Provides a JavaScript-callable `Emulator` for loading a program, running it
//! and inspecting the processor state afterwards.

use crate::{Compatibility, Cpu, ExecutionState, Outcome};
use wasm_bindgen::prelude::*;

/// Result of a completed or budget-limited run
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct RunResult {
    finished: bool,
    halted: bool,
    exit_code: u8,
    invalid_opcode: Option<u8>,
    address: Option<u16>,
}

impl RunResult {
    fn from_outcome(outcome: Option<Outcome>) -> Self {
        match outcome {
            None => RunResult {
                finished: false,
                halted: false,
                exit_code: 0,
                invalid_opcode: None,
                address: None,
            },
            Some(Outcome::Halted(code)) => RunResult {
                finished: true,
                halted: true,
                exit_code: code,
                invalid_opcode: None,
                address: None,
            },
            Some(outcome @ Outcome::InvalidOpcode { opcode, address }) => RunResult {
                finished: true,
                halted: false,
                exit_code: outcome.exit_code(),
                invalid_opcode: Some(opcode),
                address: Some(address),
            },
        }
    }
}

#[wasm_bindgen]
impl RunResult {
    /// False when the step budget ran out first
    #[wasm_bindgen(getter)]
    pub fn finished(&self) -> bool {
        self.finished
    }

    #[wasm_bindgen(getter)]
    pub fn halted(&self) -> bool {
        self.halted
    }

    #[wasm_bindgen(getter)]
    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    #[wasm_bindgen(getter)]
    pub fn invalid_opcode(&self) -> Option<u8> {
        self.invalid_opcode
    }

    /// Address of the invalid opcode, if any
    #[wasm_bindgen(getter)]
    pub fn address(&self) -> Option<u16> {
        self.address
    }
}

/// Main emulator interface for JavaScript
#[wasm_bindgen]
pub struct Emulator {
    cpu: Cpu,
}

#[wasm_bindgen]
impl Emulator {
    /// Create a new emulator in the reset state.
    ///
    /// `nmos` selects NMOS 6502 semantics instead of the reference behavior.
    #[wasm_bindgen(constructor)]
    pub fn new(nmos: bool) -> Result<Emulator, JsError> {
        let compatibility = if nmos {
            Compatibility::Nmos
        } else {
            Compatibility::Reference
        };
        let cpu = Cpu::initialize()
            .map_err(|e| JsError::new(&e.to_string()))?
            .with_compatibility(compatibility);

        Ok(Emulator { cpu })
    }

    /// Reset the CPU to initial state (clears memory)
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Load a program at the reset vector
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), JsError> {
        self.cpu
            .load_program(program)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Execute a single instruction; returns true while still running
    pub fn step(&mut self) -> bool {
        self.cpu.step() == ExecutionState::Running
    }

    /// Run until halt, invalid opcode, or `max_steps` instructions
    pub fn run(&mut self, max_steps: u32) -> RunResult {
        RunResult::from_outcome(self.cpu.run_for_steps(u64::from(max_steps)))
    }

    // Register getters
    #[wasm_bindgen(getter)]
    pub fn a(&self) -> u8 {
        self.cpu.a()
    }

    #[wasm_bindgen(getter)]
    pub fn x(&self) -> u8 {
        self.cpu.x()
    }

    #[wasm_bindgen(getter)]
    pub fn y(&self) -> u8 {
        self.cpu.y()
    }

    #[wasm_bindgen(getter)]
    pub fn pc(&self) -> u16 {
        self.cpu.pc()
    }

    #[wasm_bindgen(getter)]
    pub fn sp(&self) -> u16 {
        self.cpu.sp()
    }

    /// Packed NV-BDIZC status byte
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> u8 {
        self.cpu.status()
    }

    // Flag getters
    #[wasm_bindgen(getter)]
    pub fn flag_n(&self) -> bool {
        self.cpu.flag_n()
    }

    #[wasm_bindgen(getter)]
    pub fn flag_z(&self) -> bool {
        self.cpu.flag_z()
    }

    // Memory access methods

    /// Read a single byte from memory
    pub fn read_memory(&self, addr: u16) -> u8 {
        self.cpu.read_byte(addr)
    }

    /// Write a single byte to memory
    pub fn write_memory(&mut self, addr: u16, value: u8) {
        self.cpu.write_byte(addr, value);
    }

    /// Read a 256-byte page from memory (for efficient display)
    pub fn get_memory_page(&self, page: u8) -> Vec<u8> {
        let start = (page as u16) << 8;
        (0..256).map(|i| self.cpu.read_byte(start + i)).collect()
    }
}
