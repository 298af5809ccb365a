//! Fuzz target for program execution.
//!
//! Builds an arbitrary CPU state and program, runs it under a step budget in
//! either compatibility mode, and checks the executor invariants.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mini6502::{Compatibility, Cpu, ExecutionState, Fault, Opcode, Outcome};

/// Arbitrary CPU initial state for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzCpuState {
    a: u8,
    x: u8,
    y: u8,
    pc: u16,
    sp: u16,
    flag_c: bool,
    flag_z: bool,
    flag_n: bool,
    nmos: bool,
}

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    cpu_state: FuzzCpuState,
    /// Bytes placed at the initial PC
    program: Vec<u8>,
    /// Zero page and stack page contents
    low_memory: [u8; 512],
}

fuzz_target!(|input: FuzzInput| {
    let state = &input.cpu_state;
    let compatibility = if state.nmos {
        Compatibility::Nmos
    } else {
        Compatibility::Reference
    };

    let mut cpu = match Cpu::initialize() {
        Ok(cpu) => cpu.with_compatibility(compatibility),
        Err(_) => return,
    };

    if cpu.load_program_at(0x0000, &input.low_memory).is_err() {
        return;
    }

    // Out-of-range images must be rejected, never truncated or wrapped
    if cpu.load_program_at(state.pc, &input.program).is_err() {
        assert!(state.pc as usize + input.program.len() > 0x1_0000);
        return;
    }

    cpu.set_a(state.a);
    cpu.set_x(state.x);
    cpu.set_y(state.y);
    cpu.set_pc(state.pc);
    cpu.set_sp(state.sp);
    cpu.set_flag_c(state.flag_c);
    cpu.set_flag_z(state.flag_z);
    cpu.set_flag_n(state.flag_n);

    for _ in 0..1_000 {
        let pc = cpu.pc();
        let opcode = cpu.read_byte(pc);
        let carry = cpu.flag_c();

        match cpu.step() {
            ExecutionState::Running => {
                // No supported instruction touches carry
                assert_eq!(cpu.flag_c(), carry);
            }
            ExecutionState::Halted(code) => {
                assert_eq!(opcode, Opcode::Halt.byte());
                assert_eq!(cpu.pc(), pc.wrapping_add(2));
                assert_eq!(Outcome::Halted(code).is_error(), code == 1);
                break;
            }
            ExecutionState::Faulted(Fault::UnknownOpcode { opcode: byte, address }) => {
                assert_eq!(byte, opcode);
                assert_eq!(address, pc);
                assert!(Opcode::decode(byte).is_none());
                break;
            }
        }
    }
});
