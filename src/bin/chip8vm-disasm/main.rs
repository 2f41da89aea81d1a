// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! chip8vm-disasm: prints a listing of a Chip-8 program

use chip8vm::{error::Result, *};
use gumdrop::*;
use std::{fs::read, path::PathBuf};


#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Options, Hash)]
struct Arguments {
    #[options(help = "Show help text")]
    help: bool,
    #[options(help = "Load a ROM to disassemble", free, required)]
    pub file: PathBuf,
    #[options(
        help = "Load address (usually 200)",
        parse(try_from_str = "parse_hex"),
        default = "200"
    )]
    pub loadaddr: u16,
    #[options(help = "Start disassembling at offset...")]
    pub offset: usize,
}

fn parse_hex(value: &str) -> std::result::Result<u16, std::num::ParseIntError> {
    u16::from_str_radix(value, 16)
}

fn main() -> Result<()> {
    env_logger::init();
    let options = Arguments::parse_args_default_or_exit();
    let contents = &read(&options.file)?;
    let disassembler = Dis::default();
    for line in listing(contents, options.loadaddr, options.offset, &disassembler) {
        println!("{line}");
    }
    Ok(())
}

/// Lists `rom` from `offset` on, as if it were loaded at `loadaddr`.
/// A trailing odd byte gets a line of its own.
fn listing(rom: &[u8], loadaddr: u16, offset: usize, dis: &Dis) -> Vec<String> {
    let start = offset.min(rom.len());
    let base = loadaddr as usize + start;
    let mut words = rom[start..].chunks_exact(2);
    let mut lines: Vec<String> = words
        .by_ref()
        .enumerate()
        .map(|(index, insn)| {
            dis.at((base + 2 * index) as u16, u16::from_be_bytes([insn[0], insn[1]]))
        })
        .collect();
    if let [byte] = words.remainder() {
        lines.push(dis.byte((base + rom.len() - start - 1) as u16, *byte));
    }
    lines
}
