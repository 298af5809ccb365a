//! # mini6502
//!
//! A small instruction-level emulator for a simplified 6502-style processor.
//!
//! The crate models processor state (program counter, stack pointer, six status
//! flags, a three-entry register file) over a flat 64KB memory, and runs a
//! fetch-decode-execute loop until the program halts or hits an opcode outside
//! the supported set.
//!
//! ## Quick Start
//!
//! ```rust
//! use mini6502::{Cpu, Outcome};
//!
//! let mut cpu = Cpu::initialize().unwrap();
//!
//! // LDA #$05 ; HALT 3
//! cpu.load_program(&[0xA9, 0x05, 0x00, 0x03]).unwrap();
//!
//! assert_eq!(cpu.run(), Outcome::Halted(3));
//! assert_eq!(cpu.a(), 0x05);
//! assert!(!cpu.flag_z());
//! ```
//!
//! ## Architecture
//!
//! - **Processor state** (`cpu`): registers, flags, PC/SP and the owned memory bus
//! - **Executor** (`Cpu::step`, `Cpu::run` and the internal `instructions` module):
//!   one handler per supported opcode, dispatched by an exhaustive `match`
//! - **Opcode table** (`opcodes`, `addressing`): closed `Opcode` enumeration and
//!   its metadata
//! - **Memory** (`memory`): the `MemoryBus` seam and the `FlatMemory` buffer
//!
//! The core never performs I/O. Diagnostics go through `tracing`; installing a
//! subscriber is up to the host.
//!
//! ## Compatibility
//!
//! The default [`Compatibility::Reference`] mode reproduces the observed
//! reference behavior, quirks included: absolute LDA modes leave flags alone,
//! indexed absolute modes add the index to the loaded value, and JSR writes its
//! return address at SP without moving SP. [`Compatibility::Nmos`] switches
//! those to documented NMOS 6502 semantics.

pub mod addressing;
pub mod cpu;
pub mod memory;
pub mod opcodes;

#[cfg(feature = "wasm")]
pub mod wasm;

// Internal instruction implementations (not part of public API)
mod instructions;

use std::collections::TryReserveError;

// Re-export public API
pub use addressing::AddressingMode;
pub use cpu::{Compatibility, Cpu, Register, PROGRAM_LOAD_ADDRESS, RESET_SP, RESET_VECTOR};
pub use memory::{FlatMemory, MemoryBus, MEMORY_SIZE};
pub use opcodes::{Opcode, OpcodeMetadata, SUPPORTED_OPCODES};

/// Errors raised while setting up or loading the processor.
///
/// Running a program never fails with a `CpuError`: an unknown opcode is a
/// normal [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CpuError {
    /// The 64KB memory buffer could not be allocated.
    #[error("failed to allocate processor memory: {0}")]
    Allocation(#[from] TryReserveError),

    /// A bounded write would touch an address at or beyond 0x10000.
    ///
    /// `address` is the first byte of the rejected write and `len` its length.
    #[error("write of {len} byte(s) at 0x{address:X} exceeds the 64KB address space")]
    AddressOutOfRange {
        /// First address of the rejected write
        address: usize,
        /// Number of bytes in the rejected write
        len: usize,
    },
}

/// Why execution stopped abnormally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The byte at `address` is not a supported opcode.
    UnknownOpcode {
        /// The offending opcode byte
        opcode: u8,
        /// Address the opcode was fetched from
        address: u16,
    },
}

/// Executor state after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// The instruction completed and execution may continue.
    Running,
    /// A HALT instruction stopped execution with the given exit code.
    Halted(u8),
    /// Execution stopped on a fault.
    Faulted(Fault),
}

impl ExecutionState {
    /// Returns the terminal outcome, or `None` while still running.
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            ExecutionState::Running => None,
            ExecutionState::Halted(code) => Some(Outcome::Halted(code)),
            ExecutionState::Faulted(Fault::UnknownOpcode { opcode, address }) => {
                Some(Outcome::InvalidOpcode { opcode, address })
            }
        }
    }
}

/// Result of running a program to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// HALT was executed with this exit code.
    Halted(u8),
    /// An unsupported opcode was fetched.
    InvalidOpcode {
        /// The offending opcode byte
        opcode: u8,
        /// Address the opcode was fetched from
        address: u16,
    },
}

impl Outcome {
    /// Exit code reported by [`Outcome::exit_code`] for an invalid opcode.
    pub const INVALID_OPCODE_EXIT_CODE: u8 = 0xFF;

    /// Whether the host should treat this outcome as an error.
    ///
    /// Only a reported code of 1 is an error. Every other halt code, and an
    /// invalid opcode (reported as 255), is informational.
    pub fn is_error(self) -> bool {
        self.exit_code() == 1
    }

    /// Code reported for this outcome: the halt code, or 255 for an invalid
    /// opcode.
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Halted(code) => code,
            Outcome::InvalidOpcode { .. } => Self::INVALID_OPCODE_EXIT_CODE,
        }
    }

    /// Whether a host should print the code at all. Code 0 is silent.
    pub fn is_reported(self) -> bool {
        self.exit_code() != 0
    }

    /// Status a host process exits with: 1 for an error, 0 otherwise.
    pub fn process_exit_code(self) -> u8 {
        u8::from(self.is_error())
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Halted(code) => write!(f, "halted with exit code {}", code),
            Outcome::InvalidOpcode { opcode, address } => {
                write!(f, "invalid opcode 0x{:02X} at 0x{:04X}", opcode, address)
            }
        }
    }
}
