//! # CPU State and Execution
//!
//! This module contains the `Cpu` struct representing processor state and the
//! fetch-decode-execute loop.
//!
//! ## CPU State
//!
//! The CPU maintains:
//! - **Registers**: a three-entry file indexed A, X, Y
//! - **Program counter** (PC): 16-bit address of the next byte to fetch
//! - **Stack pointer** (SP): 16-bit absolute address used as the JSR write cursor
//! - **Status flags**: C, Z, I, D, V, N (individual bool fields)
//! - **Memory**: an exclusively owned 64KB `MemoryBus`
//!
//! ## Execution Model
//!
//! - `step()`: fetch one opcode, advance PC, dispatch, return the new `ExecutionState`
//! - `run()`: step until the program halts or faults
//! - `run_for_steps()`: same, with an instruction budget

use crate::instructions::{control, load_store};
use crate::memory::MEMORY_SIZE;
use crate::{CpuError, ExecutionState, Fault, FlatMemory, MemoryBus, Opcode, Outcome};

/// Address execution starts from after reset, and where programs are loaded.
pub const RESET_VECTOR: u16 = 0xFFFC;

/// Address `load_program` copies program bytes to.
pub const PROGRAM_LOAD_ADDRESS: u16 = RESET_VECTOR;

/// Stack pointer value after reset.
pub const RESET_SP: u16 = 0x0100;

/// Index into the register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Accumulator
    A = 0,
    /// X index register
    X = 1,
    /// Y index register
    Y = 2,
}

/// Which semantics the quirky addressing modes and JSR follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Compatibility {
    /// Observed reference behavior.
    ///
    /// - LDA absolute, absolute,X and absolute,Y leave Z/N untouched
    /// - LDA absolute,X / absolute,Y add the index to the loaded value
    /// - JSR writes the return address at SP and does not move SP
    #[default]
    Reference,

    /// Documented NMOS 6502 behavior for the same instructions.
    ///
    /// - Every LDA mode updates Z/N
    /// - Indexed absolute modes add the index to the address before the load
    /// - JSR pushes the return address high byte first and moves SP down by 2
    Nmos,
}

/// Processor state and execution context.
///
/// Generic over the memory implementation via the `MemoryBus` trait, with
/// `FlatMemory` as the default.
///
/// # Examples
///
/// ```
/// use mini6502::{Cpu, RESET_SP, RESET_VECTOR};
///
/// let cpu = Cpu::initialize().unwrap();
///
/// assert_eq!(cpu.pc(), RESET_VECTOR);
/// assert_eq!(cpu.sp(), RESET_SP);
/// assert_eq!(cpu.a(), 0x00);
/// assert!(!cpu.flag_i());
/// ```
#[derive(Debug)]
pub struct Cpu<M: MemoryBus = FlatMemory> {
    /// Register file, indexed by `Register`
    pub(crate) registers: [u8; 3],

    /// Program counter (address of next byte to fetch)
    pub(crate) pc: u16,

    /// Stack pointer (absolute address)
    pub(crate) sp: u16,

    /// Carry flag
    pub(crate) flag_c: bool,

    /// Zero flag (set if result is zero)
    pub(crate) flag_z: bool,

    /// Interrupt disable flag
    pub(crate) flag_i: bool,

    /// Decimal mode flag
    pub(crate) flag_d: bool,

    /// Overflow flag
    pub(crate) flag_v: bool,

    /// Negative flag (set if bit 7 of result is 1)
    pub(crate) flag_n: bool,

    /// Semantics selected for the quirky instructions
    pub(crate) compatibility: Compatibility,

    /// Memory bus implementation
    pub(crate) memory: M,
}

impl Cpu<FlatMemory> {
    /// Allocates a processor with 64KB of flat memory, in the reset state.
    ///
    /// # Errors
    ///
    /// Returns `CpuError::Allocation` if the memory buffer cannot be allocated.
    pub fn initialize() -> Result<Self, CpuError> {
        let memory = FlatMemory::try_new()?;
        Ok(Self::new(memory))
    }
}

impl<M: MemoryBus> Cpu<M> {
    /// Creates a CPU over the given memory bus and resets it.
    ///
    /// Resetting clears the memory, so write programs after construction.
    pub fn new(memory: M) -> Self {
        let mut cpu = Self {
            registers: [0; 3],
            pc: RESET_VECTOR,
            sp: RESET_SP,
            flag_c: false,
            flag_z: false,
            flag_i: false,
            flag_d: false,
            flag_v: false,
            flag_n: false,
            compatibility: Compatibility::default(),
            memory,
        };
        cpu.reset();
        cpu
    }

    /// Selects the compatibility mode, builder style.
    pub fn with_compatibility(mut self, compatibility: Compatibility) -> Self {
        self.compatibility = compatibility;
        self
    }

    /// Returns the active compatibility mode.
    pub fn compatibility(&self) -> Compatibility {
        self.compatibility
    }

    /// Changes the compatibility mode. Survives `reset()`.
    pub fn set_compatibility(&mut self, compatibility: Compatibility) {
        self.compatibility = compatibility;
    }

    /// Returns the processor to its initial state.
    ///
    /// - PC = `RESET_VECTOR` (0xFFFC)
    /// - SP = `RESET_SP` (0x0100)
    /// - All flags cleared
    /// - Memory and registers zero-filled
    pub fn reset(&mut self) {
        self.registers = [0; 3];
        self.pc = RESET_VECTOR;
        self.sp = RESET_SP;
        self.flag_c = false;
        self.flag_z = false;
        self.flag_i = false;
        self.flag_d = false;
        self.flag_v = false;
        self.flag_n = false;
        self.memory.clear();

        tracing::debug!("cpu reset");
    }

    /// Copies a program image to memory at `PROGRAM_LOAD_ADDRESS`.
    ///
    /// # Errors
    ///
    /// Returns `CpuError::AddressOutOfRange` if the image does not fit below
    /// 0x10000. Memory is left untouched in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use mini6502::{Cpu, CpuError};
    ///
    /// let mut cpu = Cpu::initialize().unwrap();
    ///
    /// // Four bytes fit exactly at 0xFFFC..=0xFFFF
    /// cpu.load_program(&[0xA9, 0x05, 0x00, 0x03]).unwrap();
    ///
    /// // A fifth byte would land at 0x10000
    /// let err = cpu.load_program(&[0; 5]).unwrap_err();
    /// assert_eq!(err, CpuError::AddressOutOfRange { address: 0xFFFC, len: 5 });
    /// ```
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), CpuError> {
        self.load_program_at(PROGRAM_LOAD_ADDRESS, program)
    }

    /// Copies a program image to memory starting at `address`.
    ///
    /// # Errors
    ///
    /// Same bounds rule as [`Cpu::load_program`].
    pub fn load_program_at(&mut self, address: u16, program: &[u8]) -> Result<(), CpuError> {
        let start = address as usize;
        check_range(start, program.len())?;

        // check_range guarantees every start + offset is <= 0xFFFF
        for (offset, &byte) in program.iter().enumerate() {
            self.memory.write((start + offset) as u16, byte);
        }

        tracing::debug!(
            "loaded {} byte program at 0x{:04X}",
            program.len(),
            address
        );
        Ok(())
    }

    /// Writes a 16-bit value little-endian at `address` and `address + 1`.
    ///
    /// # Errors
    ///
    /// Returns `CpuError::AddressOutOfRange` if either byte address is at or
    /// beyond 0x10000. Nothing is written in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use mini6502::Cpu;
    ///
    /// let mut cpu = Cpu::initialize().unwrap();
    /// cpu.write_word(0x0200, 0xBEEF).unwrap();
    /// assert_eq!(cpu.read_byte(0x0200), 0xEF);
    /// assert_eq!(cpu.read_byte(0x0201), 0xBE);
    ///
    /// assert!(cpu.write_word(0xFFFF, 0x1234).is_err());
    /// ```
    pub fn write_word(&mut self, address: usize, value: u16) -> Result<(), CpuError> {
        check_range(address, 2)?;

        let [low, high] = value.to_le_bytes();
        // check_range guarantees both addresses are <= 0xFFFF
        self.memory.write(address as u16, low);
        self.memory.write((address + 1) as u16, high);
        Ok(())
    }

    /// Reads a byte from memory.
    pub fn read_byte(&self, address: u16) -> u8 {
        self.memory.read(address)
    }

    /// Writes a byte to memory.
    pub fn write_byte(&mut self, address: u16, value: u8) {
        self.memory.write(address, value);
    }

    /// Reads a little-endian word; the high byte address wraps past 0xFFFF.
    pub fn read_word(&self, address: u16) -> u16 {
        let low = self.memory.read(address);
        let high = self.memory.read(address.wrapping_add(1));
        u16::from_le_bytes([low, high])
    }

    /// Executes one instruction and returns the resulting execution state.
    ///
    /// Performs the fetch-decode-execute cycle:
    /// 1. Fetch opcode byte at PC and advance PC by one
    /// 2. Decode it into an `Opcode`
    /// 3. If unsupported, return `Faulted(UnknownOpcode)` with no further mutation
    /// 4. Otherwise run the handler, which consumes its own operand bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use mini6502::{Cpu, ExecutionState};
    ///
    /// let mut cpu = Cpu::initialize().unwrap();
    /// cpu.load_program(&[0xA9, 0x80, 0x00, 0x07]).unwrap();
    ///
    /// assert_eq!(cpu.step(), ExecutionState::Running);
    /// assert_eq!(cpu.a(), 0x80);
    /// assert!(cpu.flag_n());
    ///
    /// assert_eq!(cpu.step(), ExecutionState::Halted(0x07));
    /// ```
    pub fn step(&mut self) -> ExecutionState {
        let address = self.pc;
        let byte = self.fetch_byte();

        let Some(opcode) = Opcode::decode(byte) else {
            tracing::warn!("unknown opcode 0x{:02X} at 0x{:04X}", byte, address);
            return ExecutionState::Faulted(Fault::UnknownOpcode {
                opcode: byte,
                address,
            });
        };

        tracing::trace!(
            "0x{:04X}: {} ({:?})",
            address,
            opcode.metadata().mnemonic,
            opcode.metadata().addressing_mode
        );

        match opcode {
            Opcode::Halt => control::execute_halt(self),
            Opcode::Jsr => control::execute_jsr(self),
            Opcode::LdaImmediate
            | Opcode::LdaZeroPage
            | Opcode::LdaZeroPageX
            | Opcode::LdaAbsolute
            | Opcode::LdaAbsoluteX
            | Opcode::LdaAbsoluteY => load_store::execute_lda(self, opcode),
        }
    }

    /// Runs until the program halts or faults.
    ///
    /// This loop has no budget: a program that jumps back onto itself runs
    /// forever. Use [`Cpu::run_for_steps`] for untrusted programs.
    pub fn run(&mut self) -> Outcome {
        loop {
            if let Some(outcome) = self.step().outcome() {
                tracing::debug!("run finished: {}", outcome);
                return outcome;
            }
        }
    }

    /// Runs at most `max_steps` instructions.
    ///
    /// Returns `Some(outcome)` if the program terminated within the budget,
    /// `None` if the budget ran out while still running.
    ///
    /// # Examples
    ///
    /// ```
    /// use mini6502::Cpu;
    ///
    /// let mut cpu = Cpu::initialize().unwrap();
    ///
    /// // JSR $FFFC: jumps back onto itself forever
    /// cpu.load_program(&[0x20, 0xFC, 0xFF]).unwrap();
    ///
    /// assert_eq!(cpu.run_for_steps(1_000), None);
    /// ```
    pub fn run_for_steps(&mut self, max_steps: u64) -> Option<Outcome> {
        for _ in 0..max_steps {
            if let Some(outcome) = self.step().outcome() {
                tracing::debug!("run finished: {}", outcome);
                return Some(outcome);
            }
        }

        tracing::debug!("step budget of {} exhausted at 0x{:04X}", max_steps, self.pc);
        None
    }

    // ========== Executor Primitives ==========

    /// Fetches the byte at PC and advances PC (wrapping).
    pub(crate) fn fetch_byte(&mut self) -> u8 {
        let byte = self.memory.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    /// Fetches a little-endian word at PC and advances PC by two (wrapping).
    pub(crate) fn fetch_word(&mut self) -> u16 {
        let low = self.fetch_byte();
        let high = self.fetch_byte();
        u16::from_le_bytes([low, high])
    }

    /// Writes a little-endian word; the high byte address wraps past 0xFFFF.
    pub(crate) fn write_word_wrapping(&mut self, address: u16, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.memory.write(address, low);
        self.memory.write(address.wrapping_add(1), high);
    }

    /// Updates Z and N from `value`.
    pub(crate) fn update_zn(&mut self, value: u8) {
        self.flag_z = value == 0;
        self.flag_n = (value & 0x80) != 0;
    }

    // ========== Register Getters ==========

    /// Returns a register from the register file.
    pub fn register(&self, register: Register) -> u8 {
        self.registers[register as usize]
    }

    /// Returns the accumulator register value.
    pub fn a(&self) -> u8 {
        self.register(Register::A)
    }

    /// Returns the X index register value.
    pub fn x(&self) -> u8 {
        self.register(Register::X)
    }

    /// Returns the Y index register value.
    pub fn y(&self) -> u8 {
        self.register(Register::Y)
    }

    /// Returns the program counter value.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Returns the stack pointer value.
    ///
    /// Unlike hardware 6502 SP this is a full 16-bit address, 0x0100 after reset.
    pub fn sp(&self) -> u16 {
        self.sp
    }

    /// Returns the status register as a packed byte.
    ///
    /// Bit layout (NV-BDIZC):
    /// - Bit 7: N (Negative)
    /// - Bit 6: V (Overflow)
    /// - Bit 5: (unused, always 1)
    /// - Bit 4: B (no Break flag here, always 0)
    /// - Bit 3: D (Decimal)
    /// - Bit 2: I (Interrupt Disable)
    /// - Bit 1: Z (Zero)
    /// - Bit 0: C (Carry)
    ///
    /// # Examples
    ///
    /// ```
    /// use mini6502::Cpu;
    ///
    /// let mut cpu = Cpu::initialize().unwrap();
    /// assert_eq!(cpu.status(), 0b0010_0000);
    ///
    /// cpu.set_flag_z(true);
    /// assert_eq!(cpu.status(), 0b0010_0010);
    /// ```
    pub fn status(&self) -> u8 {
        let mut status: u8 = 0b0010_0000;

        if self.flag_n {
            status |= 0b1000_0000;
        }
        if self.flag_v {
            status |= 0b0100_0000;
        }
        if self.flag_d {
            status |= 0b0000_1000;
        }
        if self.flag_i {
            status |= 0b0000_0100;
        }
        if self.flag_z {
            status |= 0b0000_0010;
        }
        if self.flag_c {
            status |= 0b0000_0001;
        }

        status
    }

    // ========== Status Flag Getters ==========

    /// Returns true if the Carry flag is set.
    pub fn flag_c(&self) -> bool {
        self.flag_c
    }

    /// Returns true if the Zero flag is set.
    pub fn flag_z(&self) -> bool {
        self.flag_z
    }

    /// Returns true if the Interrupt Disable flag is set.
    pub fn flag_i(&self) -> bool {
        self.flag_i
    }

    /// Returns true if the Decimal mode flag is set.
    pub fn flag_d(&self) -> bool {
        self.flag_d
    }

    /// Returns true if the Overflow flag is set.
    pub fn flag_v(&self) -> bool {
        self.flag_v
    }

    /// Returns true if the Negative flag is set.
    pub fn flag_n(&self) -> bool {
        self.flag_n
    }

    // ========== Setters ==========

    /// Sets a register in the register file.
    pub fn set_register(&mut self, register: Register, value: u8) {
        self.registers[register as usize] = value;
    }

    /// Sets the accumulator.
    pub fn set_a(&mut self, value: u8) {
        self.set_register(Register::A, value);
    }

    /// Sets the X index register.
    pub fn set_x(&mut self, value: u8) {
        self.set_register(Register::X, value);
    }

    /// Sets the Y index register.
    pub fn set_y(&mut self, value: u8) {
        self.set_register(Register::Y, value);
    }

    /// Sets the program counter.
    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Sets the stack pointer.
    pub fn set_sp(&mut self, value: u16) {
        self.sp = value;
    }

    /// Sets the Carry flag.
    pub fn set_flag_c(&mut self, value: bool) {
        self.flag_c = value;
    }

    /// Sets the Zero flag.
    pub fn set_flag_z(&mut self, value: bool) {
        self.flag_z = value;
    }

    /// Sets the Interrupt Disable flag.
    pub fn set_flag_i(&mut self, value: bool) {
        self.flag_i = value;
    }

    /// Sets the Decimal mode flag.
    pub fn set_flag_d(&mut self, value: bool) {
        self.flag_d = value;
    }

    /// Sets the Overflow flag.
    pub fn set_flag_v(&mut self, value: bool) {
        self.flag_v = value;
    }

    /// Sets the Negative flag.
    pub fn set_flag_n(&mut self, value: bool) {
        self.flag_n = value;
    }

    // ========== Memory Access ==========

    /// Returns a reference to the memory bus.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Returns a mutable reference to the memory bus.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }
}

/// Rejects a `len`-byte write at `address` that would cross 0x10000.
fn check_range(address: usize, len: usize) -> Result<(), CpuError> {
    match address.checked_add(len) {
        Some(end) if end <= MEMORY_SIZE => Ok(()),
        _ => Err(CpuError::AddressOutOfRange { address, len }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_initialization() {
        let cpu = Cpu::initialize().unwrap();

        assert_eq!(cpu.pc(), 0xFFFC);
        assert_eq!(cpu.sp(), 0x0100);
        assert_eq!(cpu.a(), 0x00);
        assert_eq!(cpu.x(), 0x00);
        assert_eq!(cpu.y(), 0x00);
        assert_eq!(cpu.compatibility(), Compatibility::Reference);

        assert!(!cpu.flag_c());
        assert!(!cpu.flag_z());
        assert!(!cpu.flag_i());
        assert!(!cpu.flag_d());
        assert!(!cpu.flag_v());
        assert!(!cpu.flag_n());
    }

    #[test]
    fn test_status_register_packing() {
        let mut cpu = Cpu::initialize().unwrap();
        cpu.set_flag_n(true);
        cpu.set_flag_c(true);

        assert_eq!(cpu.status(), 0b1010_0001);
    }

    #[test]
    fn test_check_range_boundaries() {
        assert!(check_range(0xFFFC, 4).is_ok());
        assert!(check_range(0x0000, MEMORY_SIZE).is_ok());
        assert!(check_range(0xFFFC, 0).is_ok());
        assert_eq!(
            check_range(0xFFFF, 2),
            Err(CpuError::AddressOutOfRange {
                address: 0xFFFF,
                len: 2
            })
        );
        assert!(check_range(usize::MAX, 1).is_err());
    }

    #[test]
    fn test_fetch_word_wraps_pc() {
        let mut cpu = Cpu::initialize().unwrap();
        cpu.write_byte(0xFFFF, 0x34);
        cpu.write_byte(0x0000, 0x12);
        cpu.set_pc(0xFFFF);

        assert_eq!(cpu.fetch_word(), 0x1234);
        assert_eq!(cpu.pc(), 0x0001);
    }

    #[test]
    fn test_write_word_wrapping_crosses_top_of_memory() {
        let mut cpu = Cpu::initialize().unwrap();
        cpu.write_word_wrapping(0xFFFF, 0xABCD);

        assert_eq!(cpu.read_byte(0xFFFF), 0xCD);
        assert_eq!(cpu.read_byte(0x0000), 0xAB);
        assert_eq!(cpu.read_word(0xFFFF), 0xABCD);
    }
}
