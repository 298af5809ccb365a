//! # Load Instructions
//!
//! This module implements LDA (Load Accumulator) across all six supported
//! addressing modes. Which modes update flags, and where the index register is
//! applied, depends on the CPU's `Compatibility`.

use crate::{AddressingMode, Compatibility, Cpu, ExecutionState, MemoryBus, Opcode, MEMORY_SIZE};

/// Executes the LDA (Load Accumulator) instruction.
///
/// Consumes the operand bytes for the opcode's addressing mode, then loads a
/// byte into the accumulator.
///
/// # Flag Behavior
///
/// | Mode | Reference | Nmos |
/// |---|---|---|
/// | Immediate, ZeroPage, ZeroPageX | Z, N | Z, N |
/// | Absolute, AbsoluteX, AbsoluteY | none | Z, N |
///
/// # Indexed Modes
///
/// - ZeroPageX, both modes: `(operand + X) & 0xFF`, so the read stays in the
///   zero page. The load is skipped, leaving A and the flags as they were,
///   if the address falls outside memory.
/// - AbsoluteX/AbsoluteY, Reference: loads `memory[address]`, then adds the
///   index register to the loaded value (wrapping).
/// - AbsoluteX/AbsoluteY, Nmos: loads `memory[address + index]` (wrapping).
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU, PC just past the opcode byte
/// * `opcode` - The decoded LDA opcode
pub(crate) fn execute_lda<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: Opcode) -> ExecutionState {
    let metadata = opcode.metadata();
    let nmos = cpu.compatibility == Compatibility::Nmos;

    match metadata.addressing_mode {
        AddressingMode::Immediate => {
            let value = cpu.fetch_byte();
            load_with_flags(cpu, value);
        }
        AddressingMode::ZeroPage => {
            let addr = cpu.fetch_byte() as u16;
            let value = cpu.memory.read(addr);
            load_with_flags(cpu, value);
        }
        AddressingMode::ZeroPageX => {
            let addr = cpu.fetch_byte().wrapping_add(cpu.x()) as u16;

            // Out-of-range addresses are a silent no-op
            if (addr as usize) < MEMORY_SIZE {
                let value = cpu.memory.read(addr);
                load_with_flags(cpu, value);
            }
        }
        AddressingMode::Absolute => {
            let addr = cpu.fetch_word();
            let value = cpu.memory.read(addr);
            cpu.set_a(value);
            if nmos {
                cpu.update_zn(value);
            }
        }
        AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => {
            let base = cpu.fetch_word();
            let index = if metadata.addressing_mode == AddressingMode::AbsoluteX {
                cpu.x()
            } else {
                cpu.y()
            };

            if nmos {
                let value = cpu.memory.read(base.wrapping_add(index as u16));
                load_with_flags(cpu, value);
            } else {
                let value = cpu.memory.read(base).wrapping_add(index);
                cpu.set_a(value);
            }
        }
    }

    ExecutionState::Running
}

/// Loads `value` into the accumulator and updates Z/N from it.
fn load_with_flags<M: MemoryBus>(cpu: &mut Cpu<M>, value: u8) {
    cpu.set_a(value);
    cpu.update_zn(value);
}
