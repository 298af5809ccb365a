//! # Control Flow Instructions
//!
//! This module implements control flow operations:
//! - HALT: stop execution with an exit code
//! - JSR: Jump to Subroutine
//!
//! There is no RTS; JSR only records its return address.

use crate::{Compatibility, Cpu, ExecutionState, MemoryBus};

/// Executes the HALT instruction (opcode 0x00).
///
/// Fetches the following byte as the exit code, leaving PC one past it.
///
/// Flags affected: None
pub(crate) fn execute_halt<M: MemoryBus>(cpu: &mut Cpu<M>) -> ExecutionState {
    let code = cpu.fetch_byte();
    tracing::debug!("HALT with exit code {} at 0x{:04X}", code, cpu.pc);
    ExecutionState::Halted(code)
}

/// Executes the JSR (Jump to Subroutine) instruction (opcode 0x20).
///
/// The return address is PC - 1 after both operand bytes are fetched, i.e.
/// the address of the last operand byte.
///
/// Reference:
/// 1. Write the return address as a little-endian word at SP (high byte
///    address wraps past 0xFFFF)
/// 2. Write its low byte at SP again
/// 3. Leave SP unchanged
///
/// Nmos:
/// 1. Write the high byte at SP, decrement SP
/// 2. Write the low byte at SP, decrement SP
///
/// Both modes then set PC to the target. Flags affected: None
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU, PC just past the opcode byte
pub(crate) fn execute_jsr<M: MemoryBus>(cpu: &mut Cpu<M>) -> ExecutionState {
    let target = cpu.fetch_word();
    let return_address = cpu.pc.wrapping_sub(1);
    let [low, high] = return_address.to_le_bytes();

    match cpu.compatibility {
        Compatibility::Reference => {
            let sp = cpu.sp;
            cpu.write_word_wrapping(sp, return_address);
            cpu.memory.write(sp, low);
        }
        Compatibility::Nmos => {
            cpu.memory.write(cpu.sp, high);
            cpu.sp = cpu.sp.wrapping_sub(1);
            cpu.memory.write(cpu.sp, low);
            cpu.sp = cpu.sp.wrapping_sub(1);
        }
    }

    cpu.pc = target;

    ExecutionState::Running
}
