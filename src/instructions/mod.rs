//! # Instruction Implementations
//!
//! Each supported instruction is a standalone handler that takes a mutable
//! reference to the CPU, with PC already advanced past the opcode byte. A
//! handler consumes its own operand bytes and returns the resulting
//! `ExecutionState`.
//!
//! ## Categories
//!
//! - **load_store**: LDA in all six supported addressing modes
//! - **control**: HALT, JSR

pub mod control;
pub mod load_store;
