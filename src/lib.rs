// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! This crate implements the core of a Chip-8 virtual machine: memory, registers,
//! the call stack, timers, the display buffer, and the fetch-decode-execute loop
//! that ties them together.
//!
//! It owns no window, plays no sound, and polls no input. Whoever drives it hands
//! a [Keypad] to each [CPU::tick], and reads back the [Screen] and timers.
//!
//! ```rust
//! use chip8vm::*;
//! # fn main() -> Result<()> {
//! let mut cpu = CPU::default();
//! cpu.load_program_bytes(&[
//!     0x60, 0x05, // ld  v0, #05
//!     0xf0, 0x33, // ld  B, v0
//! ])?;
//! cpu.set_i(0x300)?;
//! cpu.multistep(&Keypad::new(), 2)?;
//! assert_eq!(&[0, 0, 5], cpu.mem().get(0x300..0x303)?);
//! # Ok(())
//! # }
//! ```

pub mod cpu;
pub mod error;
pub mod keypad;
pub mod screen;

pub use cpu::{
    flags::Flags,
    instruction::{
        disassembler::{Dis, Disassembler},
        Insn,
    },
    mem::{Mem, Region, FONT, FONT_ADDR, MEM_SIZE, PROGRAM_ADDR},
    CPU, STACK_DEPTH,
};
pub use error::{Error, Result};
pub use keypad::Keypad;
pub use screen::{Screen, HEIGHT, WIDTH};
