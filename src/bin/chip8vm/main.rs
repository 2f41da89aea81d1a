// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! chip8vm: runs a Chip-8 program without a window
//!
//! The program runs for a fixed number of cycles, paced at a target frame rate,
//! then the screen and registers are printed to stdout.

#[cfg(test)]
mod tests;

use chip8vm::error::Error::BreakpointHit;
use chip8vm::{error::{Error, Result}, *};
use gumdrop::*;
use owo_colors::OwoColorize;
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

pub fn main() -> Result<()> {
    env_logger::init();
    let options = Arguments::parse_args_default_or_exit();
    let mut state = State::new(options)?;
    for result in &mut state {
        if let Err(e) = result {
            eprintln!("{}", e.bold().red());
            break;
        }
    }
    state.cpu.screen().print_screen();
    state.cpu.dump();
    Ok(())
}

/// Parses a hexadecimal string into a u16
fn parse_hex(value: &str) -> std::result::Result<u16, std::num::ParseIntError> {
    u16::from_str_radix(value, 16)
}

/// Presses every key named in `held`, using the QWERTY layout from [Keypad::map_qwerty].
/// Characters with no mapping are [Error::InvalidKey].
fn parse_keys(held: &str) -> Result<Keypad> {
    let mut keys = Keypad::new();
    for c in held.chars() {
        let key = Keypad::map_qwerty(c).ok_or(Error::InvalidKey { key: c as usize })?;
        keys.press(key)?;
    }
    Ok(keys)
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Options, Hash)]
struct Arguments {
    #[options(help = "Load a ROM to run on the Chip-8.", required, free)]
    pub file: PathBuf,
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(help = "Enable debug mode at startup.")]
    pub debug: bool,
    #[options(help = "Enable pause mode at startup. Paused programs advance one instruction per frame.")]
    pub pause: bool,

    #[options(help = "Stop after this many cycles.", default = "600", meta = "N")]
    pub cycles: usize,
    #[options(help = "Set the instructions-per-frame rate.", default = "10", meta = "N")]
    pub step: usize,
    #[options(help = "Set the target framerate. 0 runs unthrottled.", default = "60", meta = "FR")]
    pub frame_rate: u64,

    #[options(
        long = "break",
        help = "Set breakpoints for the emulator to stop at.",
        parse(try_from_str = "parse_hex"),
        meta = "BP"
    )]
    pub breakpoints: Vec<u16>,

    #[options(
        help = "Hold these keys for the whole run (QWERTY layout, e.g. \"qe\").",
        meta = "KEYS"
    )]
    pub hold: String,
}

#[derive(Debug)]
struct State {
    pub step: usize,
    pub cycles: usize,
    pub rate: u64,
    pub cpu: CPU,
    pub keys: Keypad,
    pub ft: Instant,
}

impl State {
    fn new(options: Arguments) -> Result<Self> {
        Ok(State {
            step: options.step.max(1),
            cycles: options.cycles,
            rate: options.frame_rate,
            cpu: CPU::new(
                &options.file,
                Dis::default(),
                options.breakpoints,
                Flags {
                    debug: options.debug,
                    pause: options.pause,
                },
            )?,
            keys: parse_keys(&options.hold)?,
            ft: Instant::now(),
        })
    }
    fn remaining(&self) -> usize {
        self.cycles.saturating_sub(self.cpu.cycle())
    }
    fn tick_cpu(&mut self) -> Result<()> {
        if self.cpu.flags.pause {
            self.cpu.singlestep(&self.keys)?;
        } else {
            let ticks = self.step.min(self.remaining());
            self.cpu.multistep(&self.keys, ticks)?;
        }
        Ok(())
    }
    fn wait_for_next_frame(&mut self) {
        if self.rate == 0 {
            return;
        }
        let rate = Duration::from_nanos(1_000_000_000 / self.rate + 1);
        std::thread::sleep(rate.saturating_sub(self.ft.elapsed()));
        self.ft += rate;
    }
}

impl Iterator for State {
    type Item = Result<()>;

    /// Runs one frame's worth of instructions
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() == 0 {
            return None;
        }
        self.wait_for_next_frame();
        // Allow breakpoint hit messages
        match self.tick_cpu() {
            Err(BreakpointHit { addr, next }) => {
                eprintln!("Breakpoint hit: {:3x} ({:4x})", addr, next);
            }
            Err(e) => return Some(Err(e)),
            _ => (),
        }
        Some(Ok(()))
    }
}
