//! Command-line runner for the mini6502 emulator.
//!
//! Loads a program image at the reset vector (or `--load-address`), runs it
//! and reports the exit code:
//! 1. **File mode:** `mini6502 program.bin` loads raw bytes from disk.
//! 2. **Hex mode:** `mini6502 --hex "A9 05 00 03"` parses bytes from the command line.
//! 3. **Demo mode:** with neither, runs the built-in `LDA #$05 ; HALT 3` program.
//!
//! A non-zero code is printed as `Exit Code (N)`, on stderr for code 1 and on
//! stdout otherwise; an invalid opcode reports 255. The process exits with 1
//! for code 1 and 0 for everything else. Set `RUST_LOG=trace` to see each
//! executed instruction.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use mini6502::{Compatibility, Cpu, CpuError, Outcome};
use tracing_subscriber::EnvFilter;

/// LDA #$05 ; HALT 3
const DEMO_PROGRAM: [u8; 4] = [0xA9, 0x05, 0x00, 0x03];

/// Exit code used when the step budget runs out.
const BUDGET_EXHAUSTED_EXIT_CODE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "mini6502",
    author,
    version,
    about = "Run a program on the mini6502 emulator",
    long_about = "Loads a program at 0xFFFC, runs it until HALT or an invalid opcode, and reports the halt code.\n\nExamples:\n  mini6502 program.bin\n  mini6502 --hex \"A9 05 00 03\"\n  mini6502 --load-address 0x0200 --hex \"20 04 02 00 00 07\"\n  mini6502 --compat nmos --max-steps 10000 program.bin"
)]
struct Cli {
    /// Raw program image to load.
    #[arg(conflicts_with = "hex")]
    program: Option<PathBuf>,

    /// Program bytes as hex, separated by spaces or commas (e.g. "A9 05 00 03").
    #[arg(long)]
    hex: Option<String>,

    /// Semantics for absolute LDA modes and JSR.
    #[arg(long, value_enum, default_value_t = CompatArg::Reference)]
    compat: CompatArg,

    /// Stop after this many instructions if the program has not halted.
    #[arg(long)]
    max_steps: Option<u64>,

    /// Load the program here and start execution at it (hex, e.g. 0x0200).
    #[arg(long, value_parser = parse_address)]
    load_address: Option<u16>,
}

/// Where a report line goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum CompatArg {
    /// Observed reference behavior
    Reference,
    /// Documented NMOS 6502 behavior
    Nmos,
}

impl From<CompatArg> for Compatibility {
    fn from(arg: CompatArg) -> Self {
        match arg {
            CompatArg::Reference => Compatibility::Reference,
            CompatArg::Nmos => Compatibility::Nmos,
        }
    }
}

/// Failures of the runner itself, as opposed to program outcomes.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("could not read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid hex byte '{0}'")]
    Hex(String),

    #[error(transparent)]
    Cpu(#[from] CpuError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(Some(outcome)) => {
            match report(outcome) {
                Some((Stream::Stderr, line)) => eprintln!("{}", line),
                Some((Stream::Stdout, line)) => println!("{}", line),
                None => {}
            }
            ExitCode::from(outcome.process_exit_code())
        }
        Ok(None) => {
            eprintln!("step budget exhausted before the program halted");
            ExitCode::from(BUDGET_EXHAUSTED_EXIT_CODE)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Loads and runs the selected program. `Ok(None)` means the step budget ran out.
fn run(cli: &Cli) -> Result<Option<Outcome>, CliError> {
    let program = match (&cli.program, &cli.hex) {
        (Some(path), _) => std::fs::read(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?,
        (None, Some(hex)) => parse_hex(hex)?,
        (None, None) => DEMO_PROGRAM.to_vec(),
    };

    let mut cpu = Cpu::initialize()?.with_compatibility(cli.compat.into());
    match cli.load_address {
        Some(address) => {
            cpu.load_program_at(address, &program)?;
            cpu.set_pc(address);
        }
        None => cpu.load_program(&program)?,
    }

    let outcome = match cli.max_steps {
        Some(limit) => cpu.run_for_steps(limit),
        None => Some(cpu.run()),
    };

    tracing::info!(
        "final state: A=0x{:02X} X=0x{:02X} Y=0x{:02X} PC=0x{:04X} SP=0x{:04X} P=0b{:08b}",
        cpu.a(),
        cpu.x(),
        cpu.y(),
        cpu.pc(),
        cpu.sp(),
        cpu.status()
    );

    Ok(outcome)
}

/// The line to print for `outcome`, and where. Code 0 prints nothing.
fn report(outcome: Outcome) -> Option<(Stream, String)> {
    if !outcome.is_reported() {
        return None;
    }

    let stream = if outcome.is_error() {
        Stream::Stderr
    } else {
        Stream::Stdout
    };
    let line = match outcome {
        Outcome::Halted(code) => format!("Exit Code ({})", code),
        Outcome::InvalidOpcode { .. } => {
            format!("Exit Code ({}) {}", outcome.exit_code(), outcome)
        }
    };

    Some((stream, line))
}

fn strip_hex_prefix(token: &str) -> &str {
    token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .or_else(|| token.strip_prefix('$'))
        .unwrap_or(token)
}

/// Parses whitespace- or comma-separated hex bytes, with optional `0x`/`$` prefixes.
fn parse_hex(text: &str) -> Result<Vec<u8>, CliError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            u8::from_str_radix(strip_hex_prefix(token), 16)
                .map_err(|_| CliError::Hex(token.to_string()))
        })
        .collect()
}

fn parse_address(text: &str) -> Result<u16, String> {
    u16::from_str_radix(strip_hex_prefix(text), 16)
        .map_err(|e| format!("invalid address '{}': {}", text, e))
}
