// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Renders Chip-8 words as assembly, one listing line at a time
use super::Insn;
use imperative_rs::InstructionSet;
use owo_colors::{OwoColorize, Style};

/// Turns Chip-8 words into text
pub trait Disassembler {
    /// Disassemble a single word
    fn once(&self, insn: u16) -> String;

    /// Disassemble the word at `addr` as a listing line: `addr: insn word`
    fn at(&self, addr: u16, insn: u16) -> String {
        format!("{addr:03x}: {:<24} {:04x}", self.once(insn), insn.bright_black())
    }
}

/// Disassembles Chip-8 instructions, styling valid and unrecognized words differently
///
/// Unrecognized words are shown with their opcode group (the high nibble),
/// matching how the CPU reports them.
/// # Examples
/// ```rust
/// # use chip8vm::*;
/// let dis = Dis::default();
/// assert!(dis.once(0x8a0f).contains("inval  8a0f (8xxx)"));
/// assert!(dis.at(0x200, 0x00e0).starts_with("200: "));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dis {
    /// Style for words that don't decode
    pub invalid: Style,
    /// Style for decoded instructions
    pub normal: Style,
}

impl Dis {
    /// Lists a lone trailing byte, which can't hold an instruction
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// assert!(Dis::default().byte(0x203, 0x12).contains("203: inval  12"));
    /// ```
    pub fn byte(&self, addr: u16, byte: u8) -> String {
        format!(
            "{addr:03x}: {}",
            format_args!("inval  {byte:02x} (odd byte)").style(self.invalid)
        )
    }
}

impl Default for Dis {
    fn default() -> Self {
        Self {
            invalid: Style::new().bold().red(),
            normal: Style::new().green(),
        }
    }
}

impl Disassembler for Dis {
    fn once(&self, insn: u16) -> String {
        match Insn::decode(&insn.to_be_bytes()) {
            Ok((_, decoded)) => decoded.style(self.normal).to_string(),
            Err(_) => format_args!("inval  {insn:04x} ({:x}xxx)", insn >> 12)
                .style(self.invalid)
                .to_string(),
        }
    }
}
