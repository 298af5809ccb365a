//! Property-based tests for CPU invariants.
//!
//! These tests use proptest to check executor invariants across arbitrary
//! operands, register values and programs.

use mini6502::{Cpu, ExecutionState, MemoryBus, Opcode, Outcome, SUPPORTED_OPCODES};
use proptest::prelude::*;

/// Helper function to create a CPU with PC at 0x8000
fn setup_cpu() -> Cpu {
    let mut cpu = Cpu::initialize().unwrap();
    cpu.set_pc(0x8000);
    cpu
}

/// Opcodes that fall through to the next instruction
fn straight_line_opcodes() -> Vec<Opcode> {
    SUPPORTED_OPCODES
        .iter()
        .copied()
        .filter(|op| !matches!(op, Opcode::Halt | Opcode::Jsr))
        .collect()
}

/// A straight-line instruction with arbitrary operands, as raw bytes.
fn straight_line_instruction() -> impl Strategy<Value = Vec<u8>> {
    (
        prop::sample::select(straight_line_opcodes()),
        any::<u8>(),
        any::<u8>(),
    )
        .prop_map(|(op, lo, hi)| {
            let mut bytes = vec![op.byte(), lo, hi];
            bytes.truncate(op.metadata().size_bytes() as usize);
            bytes
        })
}

// ========== Termination ==========

proptest! {
    /// Property: supported-only programs ending in HALT stop with the halt code
    /// and PC one past the code byte
    #[test]
    fn prop_supported_program_halts_with_code(
        body in prop::collection::vec(straight_line_instruction(), 0..20),
        code in any::<u8>(),
    ) {
        let mut program: Vec<u8> = body.into_iter().flatten().collect();
        program.extend_from_slice(&[0x00, code]);

        let mut cpu = setup_cpu();
        cpu.load_program_at(0x8000, &program).unwrap();

        prop_assert_eq!(cpu.run(), Outcome::Halted(code));
        prop_assert_eq!(cpu.pc(), 0x8000 + program.len() as u16);
    }

    /// Property: an unsupported opcode always faults at its own address
    #[test]
    fn prop_unknown_opcode_faults(
        byte in any::<u8>().prop_filter("unsupported", |b| Opcode::decode(*b).is_none()),
        pc in 0u16..=0xFFFF,
    ) {
        let mut cpu = Cpu::initialize().unwrap();
        cpu.write_byte(pc, byte);
        cpu.set_pc(pc);

        prop_assert_eq!(cpu.run(), Outcome::InvalidOpcode { opcode: byte, address: pc });
        prop_assert_eq!(cpu.pc(), pc.wrapping_add(1));
    }

    /// Property: arbitrary programs never panic under a step budget
    #[test]
    fn prop_arbitrary_program_never_panics(
        program in prop::collection::vec(any::<u8>(), 0..64),
        x in any::<u8>(),
        y in any::<u8>(),
        sp in any::<u16>(),
    ) {
        let mut cpu = setup_cpu();
        cpu.load_program_at(0x8000, &program).unwrap();
        cpu.set_x(x);
        cpu.set_y(y);
        cpu.set_sp(sp);

        let _ = cpu.run_for_steps(256);
    }
}

// ========== Flag N/Z ==========

proptest! {
    /// Property: N equals bit 7 and Z equals (value == 0) for LDA immediate
    #[test]
    fn prop_lda_immediate_zn_flags(value in any::<u8>()) {
        let mut cpu = setup_cpu();
        cpu.load_program_at(0x8000, &[0xA9, value]).unwrap();

        prop_assert_eq!(cpu.step(), ExecutionState::Running);

        prop_assert_eq!(cpu.a(), value);
        prop_assert_eq!(cpu.flag_n(), (value & 0x80) != 0);
        prop_assert_eq!(cpu.flag_z(), value == 0);
    }

    /// Property: LDA zero page,X loads memory[(operand + X) & 0xFF] and sets
    /// Z/N for every operand/index pair
    #[test]
    fn prop_lda_zero_page_x_wraps_within_zero_page(
        operand in any::<u8>(),
        x in any::<u8>(),
        value in any::<u8>(),
    ) {
        let mut cpu = setup_cpu();
        cpu.load_program_at(0x8000, &[0xB5, operand]).unwrap();
        cpu.set_x(x);
        cpu.write_byte(operand.wrapping_add(x) as u16, value);
        let unwrapped = operand as u16 + x as u16;
        if unwrapped > 0xFF {
            cpu.write_byte(unwrapped, !value);
        }

        cpu.step();

        prop_assert_eq!(cpu.a(), value);
        prop_assert_eq!(cpu.flag_z(), value == 0);
        prop_assert_eq!(cpu.flag_n(), (value & 0x80) != 0);
    }

    /// Property: absolute-family LDA never changes any flag in reference mode
    #[test]
    fn prop_absolute_lda_preserves_status(
        opcode in prop::sample::select(vec![0xADu8, 0xBD, 0xB9]),
        addr in any::<u16>(),
        value in any::<u8>(),
        status_bits in any::<u8>(),
    ) {
        let mut cpu = setup_cpu();
        cpu.write_byte(addr, value);
        let [lo, hi] = addr.to_le_bytes();
        cpu.load_program_at(0x8000, &[opcode, lo, hi]).unwrap();
        cpu.set_flag_z(status_bits & 0x02 != 0);
        cpu.set_flag_n(status_bits & 0x80 != 0);
        cpu.set_flag_c(status_bits & 0x01 != 0);
        let status = cpu.status();

        cpu.step();

        prop_assert_eq!(cpu.status(), status);
    }
}

// ========== Memory ==========

proptest! {
    /// Property: write_word then two byte reads reconstructs the value little-endian
    #[test]
    fn prop_write_word_round_trip(address in 0usize..0xFFFF, value in any::<u16>()) {
        let mut cpu = Cpu::initialize().unwrap();

        cpu.write_word(address, value).unwrap();

        let low = cpu.memory().read(address as u16);
        let high = cpu.memory().read(address as u16 + 1);
        prop_assert_eq!(u16::from_le_bytes([low, high]), value);
    }

    /// Property: write_word rejects every address whose high byte would not fit
    #[test]
    fn prop_write_word_out_of_range(address in 0xFFFFusize..0x2_0000, value in any::<u16>()) {
        let mut cpu = Cpu::initialize().unwrap();

        prop_assert!(cpu.write_word(address, value).is_err());
    }

    /// Property: reset restores the initial state from any prior state
    #[test]
    fn prop_reset_from_any_state(
        a in any::<u8>(),
        pc in any::<u16>(),
        sp in any::<u16>(),
        flags in any::<u8>(),
        addr in any::<u16>(),
        byte in any::<u8>(),
    ) {
        let mut cpu = Cpu::initialize().unwrap();
        cpu.set_a(a);
        cpu.set_pc(pc);
        cpu.set_sp(sp);
        cpu.set_flag_c(flags & 0x01 != 0);
        cpu.set_flag_v(flags & 0x40 != 0);
        cpu.write_byte(addr, byte);

        cpu.reset();

        prop_assert_eq!(cpu.pc(), 0xFFFC);
        prop_assert_eq!(cpu.sp(), 0x0100);
        prop_assert_eq!(cpu.a(), 0);
        prop_assert_eq!(cpu.status(), 0x20);
        prop_assert_eq!(cpu.read_byte(addr), 0);
    }
}
