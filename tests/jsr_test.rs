//! Tests for the JSR (Jump to Subroutine) instruction.
//!
//! Tests cover:
//! - PC set to the target address
//! - Return address (address of the last operand byte) written at SP
//! - Stack pointer left unchanged
//! - No flags or registers affected

use mini6502::{Cpu, ExecutionState, MemoryBus, Outcome};

/// Helper function to create a CPU with a program at 0x8000 and PC pointing at it
fn setup_cpu(program: &[u8]) -> Cpu {
    let mut cpu = Cpu::initialize().unwrap();
    cpu.load_program_at(0x8000, program).unwrap();
    cpu.set_pc(0x8000);
    cpu
}

#[test]
fn test_jsr_sets_pc_to_target() {
    // JSR $1234
    let mut cpu = setup_cpu(&[0x20, 0x34, 0x12]);

    assert_eq!(cpu.step(), ExecutionState::Running);

    assert_eq!(cpu.pc(), 0x1234);
}

#[test]
fn test_jsr_writes_return_address_at_sp() {
    let mut cpu = setup_cpu(&[0x20, 0x34, 0x12]);

    cpu.step();

    // Return address is 0x8002, the last operand byte
    assert_eq!(cpu.memory().read(0x0100), 0x02);
    assert_eq!(cpu.memory().read(0x0101), 0x80);
    assert_eq!(cpu.read_word(0x0100), 0x8002);
}

#[test]
fn test_jsr_does_not_move_sp() {
    let mut cpu = setup_cpu(&[0x20, 0x34, 0x12]);

    cpu.step();

    assert_eq!(cpu.sp(), 0x0100);
}

#[test]
fn test_nested_jsr_overwrites_same_slot() {
    // JSR $9000 ; at $9000: JSR $A000
    let mut cpu = setup_cpu(&[0x20, 0x00, 0x90]);
    cpu.load_program_at(0x9000, &[0x20, 0x00, 0xA0]).unwrap();

    cpu.step();
    cpu.step();

    assert_eq!(cpu.pc(), 0xA000);
    assert_eq!(cpu.read_word(0x0100), 0x9002);
}

#[test]
fn test_jsr_with_sp_at_top_of_memory_wraps() {
    let mut cpu = setup_cpu(&[0x20, 0x00, 0x90]);
    cpu.set_sp(0xFFFF);

    cpu.step();

    assert_eq!(cpu.memory().read(0xFFFF), 0x02);
    assert_eq!(cpu.memory().read(0x0000), 0x80);
    assert_eq!(cpu.sp(), 0xFFFF);
}

#[test]
fn test_jsr_preserves_flags_and_registers() {
    let mut cpu = setup_cpu(&[0x20, 0x00, 0x90]);
    cpu.set_a(0x11);
    cpu.set_x(0x22);
    cpu.set_y(0x33);
    cpu.set_flag_c(true);
    cpu.set_flag_n(true);
    let status = cpu.status();

    cpu.step();

    assert_eq!(cpu.a(), 0x11);
    assert_eq!(cpu.x(), 0x22);
    assert_eq!(cpu.y(), 0x33);
    assert_eq!(cpu.status(), status);
}

#[test]
fn test_jsr_then_halt_at_target() {
    let mut cpu = setup_cpu(&[0x20, 0x00, 0x90]);
    cpu.load_program_at(0x9000, &[0x00, 0x2A]).unwrap();

    cpu.step();
    assert_eq!(cpu.pc(), 0x9000);

    assert_eq!(cpu.run(), Outcome::Halted(0x2A));
    assert_eq!(cpu.pc(), 0x9002);
}
