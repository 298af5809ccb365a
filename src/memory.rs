//! # Memory Bus Abstraction
//!
//! This module provides the `MemoryBus` trait that decouples the CPU from a
//! specific memory implementation, and `FlatMemory`, a single owned 64KB buffer.
//!
//! ## Design Principles
//!
//! - Addresses are `u16`, so every access is inside the 64KB space by construction
//! - No bus errors: reads and writes always succeed
//! - Bounds checks for wider addresses (program loads, word writes) live on the CPU
//! - Allocation is fallible: `FlatMemory::try_new` reports failure instead of aborting

use std::collections::TryReserveError;

/// Size of the flat address space in bytes (64KB).
pub const MEMORY_SIZE: usize = 0x1_0000;

/// Memory bus trait for the CPU to read/write bytes.
///
/// The CPU owns exactly one bus and accesses all memory through it.
///
/// # Examples
///
/// ```
/// use mini6502::{FlatMemory, MemoryBus};
///
/// let mut mem = FlatMemory::try_new().unwrap();
/// mem.write(0x1234, 0x42);
/// assert_eq!(mem.read(0x1234), 0x42);
///
/// mem.clear();
/// assert_eq!(mem.read(0x1234), 0x00);
/// ```
///
/// ## Implementing Custom Memory
///
/// ```
/// use mini6502::MemoryBus;
///
/// struct WriteCounting {
///     data: Vec<u8>,
///     writes: usize,
/// }
///
/// impl MemoryBus for WriteCounting {
///     fn read(&self, addr: u16) -> u8 {
///         self.data[addr as usize]
///     }
///
///     fn write(&mut self, addr: u16, value: u8) {
///         self.writes += 1;
///         self.data[addr as usize] = value;
///     }
///
///     fn clear(&mut self) {
///         self.data.fill(0);
///     }
/// }
/// ```
pub trait MemoryBus {
    /// Reads a byte from the specified 16-bit address.
    ///
    /// Must never panic for any `u16` address.
    fn read(&self, addr: u16) -> u8;

    /// Writes a byte to the specified 16-bit address.
    ///
    /// Must never panic for any `u16` address.
    fn write(&mut self, addr: u16, value: u8);

    /// Zero-fills the whole address space. Called by `Cpu::reset`.
    fn clear(&mut self);
}

/// Simple 64KB flat memory implementation.
///
/// All 65536 addresses (0x0000-0xFFFF) map to one contiguous buffer that is
/// sized once at construction and never resized.
pub struct FlatMemory {
    /// 64KB contiguous buffer, always exactly `MEMORY_SIZE` long
    data: Box<[u8]>,
}

impl FlatMemory {
    /// Allocates a new zero-filled 64KB memory.
    ///
    /// # Errors
    ///
    /// Returns the reservation error if the 64KB buffer cannot be allocated.
    pub fn try_new() -> Result<Self, TryReserveError> {
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(MEMORY_SIZE)?;
        buffer.resize(MEMORY_SIZE, 0u8);

        Ok(Self {
            data: buffer.into_boxed_slice(),
        })
    }

    /// Returns the whole memory as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for FlatMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|&&b| b != 0).count();
        f.debug_struct("FlatMemory")
            .field("size", &MEMORY_SIZE)
            .field("non_zero_bytes", &used)
            .finish()
    }
}

impl MemoryBus for FlatMemory {
    fn read(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.data[addr as usize] = value;
    }

    fn clear(&mut self) {
        self.data.fill(0);
    }
}
