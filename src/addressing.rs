//! # Addressing Modes
//!
//! This module defines the addressing modes used by the supported instruction
//! set. Each mode determines how the CPU interprets the operand bytes that
//! follow an opcode.

/// Addressing mode enumeration.
///
/// # Operand Sizes
///
/// - **1 byte**: Immediate, ZeroPage, ZeroPageX
/// - **2 bytes**: Absolute, AbsoluteX, AbsoluteY
///
/// HALT's exit-code byte is modelled as an `Immediate` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// 8-bit constant operand in instruction.
    ///
    /// Example: LDA #$10 (load immediate value 0x10 into accumulator)
    Immediate,

    /// 8-bit address in zero page (0x00-0xFF).
    ///
    /// Example: LDA $80 (load from address 0x0080)
    ZeroPage,

    /// Zero page address indexed by X register.
    ///
    /// Example: LDA $80,X. The sum wraps within the zero page.
    ZeroPageX,

    /// Full 16-bit little-endian address.
    ///
    /// Example: JSR $1234
    Absolute,

    /// 16-bit address indexed by X register.
    ///
    /// Example: LDA $1234,X
    AbsoluteX,

    /// 16-bit address indexed by Y register.
    ///
    /// Example: LDA $1234,Y
    AbsoluteY,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_bytes(self) -> u8 {
        match self {
            AddressingMode::Immediate | AddressingMode::ZeroPage | AddressingMode::ZeroPageX => 1,
            AddressingMode::Absolute | AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => 2,
        }
    }
}
