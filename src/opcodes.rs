//! # Opcode Table
//!
//! The closed set of supported opcodes and their static metadata.
//!
//! Decoding a raw byte yields `Some(Opcode)` for a supported instruction and
//! `None` otherwise; the executor turns `None` into an invalid-opcode outcome.
//! Dispatch is an exhaustive `match` over [`Opcode`], so adding a variant
//! forces every consumer to handle it.

use crate::addressing::AddressingMode;

/// A supported opcode.
///
/// The discriminant is the opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// HALT: fetch exit code byte and stop.
    Halt = 0x00,
    /// JSR absolute.
    Jsr = 0x20,
    /// LDA zero page.
    LdaZeroPage = 0xA5,
    /// LDA immediate.
    LdaImmediate = 0xA9,
    /// LDA absolute.
    LdaAbsolute = 0xAD,
    /// LDA zero page,X.
    LdaZeroPageX = 0xB5,
    /// LDA absolute,Y.
    LdaAbsoluteY = 0xB9,
    /// LDA absolute,X.
    LdaAbsoluteX = 0xBD,
}

/// Every supported opcode, in ascending byte order.
pub const SUPPORTED_OPCODES: [Opcode; 8] = [
    Opcode::Halt,
    Opcode::Jsr,
    Opcode::LdaZeroPage,
    Opcode::LdaImmediate,
    Opcode::LdaAbsolute,
    Opcode::LdaZeroPageX,
    Opcode::LdaAbsoluteY,
    Opcode::LdaAbsoluteX,
];

/// Static metadata for a single opcode.
///
/// # Examples
///
/// ```
/// use mini6502::{AddressingMode, Opcode};
///
/// let lda = Opcode::decode(0xA9).unwrap().metadata();
/// assert_eq!(lda.mnemonic, "LDA");
/// assert_eq!(lda.addressing_mode, AddressingMode::Immediate);
/// assert_eq!(lda.size_bytes(), 2);
///
/// assert!(Opcode::decode(0xFF).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Instruction mnemonic (e.g., "LDA", "JSR").
    pub mnemonic: &'static str,

    /// How the instruction interprets its operand bytes.
    pub addressing_mode: AddressingMode,
}

impl OpcodeMetadata {
    /// Total instruction size in bytes (opcode + operands).
    pub const fn size_bytes(&self) -> u8 {
        1 + self.addressing_mode.operand_bytes()
    }
}

impl Opcode {
    /// Decodes a raw opcode byte.
    pub const fn decode(byte: u8) -> Option<Opcode> {
        match byte {
            0x00 => Some(Opcode::Halt),
            0x20 => Some(Opcode::Jsr),
            0xA5 => Some(Opcode::LdaZeroPage),
            0xA9 => Some(Opcode::LdaImmediate),
            0xAD => Some(Opcode::LdaAbsolute),
            0xB5 => Some(Opcode::LdaZeroPageX),
            0xB9 => Some(Opcode::LdaAbsoluteY),
            0xBD => Some(Opcode::LdaAbsoluteX),
            _ => None,
        }
    }

    /// The opcode byte.
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Returns the static metadata for this opcode.
    pub const fn metadata(self) -> OpcodeMetadata {
        let (mnemonic, addressing_mode) = match self {
            Opcode::Halt => ("HALT", AddressingMode::Immediate),
            Opcode::Jsr => ("JSR", AddressingMode::Absolute),
            Opcode::LdaImmediate => ("LDA", AddressingMode::Immediate),
            Opcode::LdaZeroPage => ("LDA", AddressingMode::ZeroPage),
            Opcode::LdaZeroPageX => ("LDA", AddressingMode::ZeroPageX),
            Opcode::LdaAbsolute => ("LDA", AddressingMode::Absolute),
            Opcode::LdaAbsoluteX => ("LDA", AddressingMode::AbsoluteX),
            Opcode::LdaAbsoluteY => ("LDA", AddressingMode::AbsoluteY),
        };

        OpcodeMetadata {
            mnemonic,
            addressing_mode,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Opcode::decode(byte).ok_or(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_round_trips_every_supported_opcode() {
        for opcode in SUPPORTED_OPCODES {
            assert_eq!(Opcode::decode(opcode.byte()), Some(opcode));
        }
    }

    #[test]
    fn test_decode_rejects_everything_else() {
        let supported: Vec<u8> = SUPPORTED_OPCODES.iter().map(|op| op.byte()).collect();
        let rejected = (0u8..=255)
            .filter(|b| !supported.contains(b))
            .filter(|&b| Opcode::decode(b).is_none())
            .count();
        assert_eq!(rejected, 256 - SUPPORTED_OPCODES.len());
    }

    #[test]
    fn test_instruction_sizes() {
        assert_eq!(Opcode::Halt.metadata().size_bytes(), 2);
        assert_eq!(Opcode::LdaImmediate.metadata().size_bytes(), 2);
        assert_eq!(Opcode::LdaZeroPageX.metadata().size_bytes(), 2);
        assert_eq!(Opcode::LdaAbsoluteY.metadata().size_bytes(), 3);
        assert_eq!(Opcode::Jsr.metadata().size_bytes(), 3);
    }

    #[test]
    fn test_try_from_reports_unknown_byte() {
        assert_eq!(Opcode::try_from(0xFF), Err(0xFF));
        assert_eq!(Opcode::try_from(0x20), Ok(Opcode::Jsr));
    }
}
