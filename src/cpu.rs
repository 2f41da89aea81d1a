// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Decodes and runs instructions


pub mod behavior;
pub mod flags;
pub mod instruction;
pub mod mem;

use self::{
    flags::Flags,
    instruction::{
        disassembler::{Dis, Disassembler},
        Insn,
    },
    mem::{Mem, Region::*, FONT_ADDR, PROGRAM_ADDR},
};
use crate::{
    error::{Error, Result},
    keypad::Keypad,
    screen::Screen,
};
use imperative_rs::InstructionSet;
use log::{debug, error, info, warn};
use owo_colors::OwoColorize;
use std::{fmt::Debug, io::Read, path::Path};

type Reg = usize;
type Adr = u16;
type Nib = u8;

/// Number of return addresses the stack can hold
pub const STACK_DEPTH: usize = 16;
/// Highest address in the 4 KiB address space
const ADDR_MAX: Adr = 0x0fff;

/// Represents the internal state of the CPU interpreter
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CPU {
    /// Flags that control how the CPU behaves, but which aren't inherent to the
    /// chip-8. Includes debug and pause.
    pub flags: Flags,
    // memory
    mem: Mem,
    screen: Screen,
    stack: [Adr; STACK_DEPTH],
    sp: usize,
    // registers
    pc: Adr,
    i: Adr,
    v: [u8; 16],
    delay: u8,
    sound: u8,
    // Execution data
    cycle: usize,
    breakpoints: Vec<Adr>,
    #[cfg_attr(feature = "serde", serde(skip))]
    disassembler: Dis,
}

// public interface
impl CPU {
    /// Constructs a new CPU, and loads the program at `rom` into it
    /// # Examples
    /// ```rust,no_run
    /// # use chip8vm::*;
    /// let cpu = CPU::new(
    ///     "roms/IBM Logo.ch8",
    ///     Dis::default(),
    ///     vec![], // Breakpoints
    ///     Flags::default()
    /// ).expect("IBM Logo.ch8 should be readable");
    /// dbg!(cpu);
    /// ```
    pub fn new(
        rom: impl AsRef<Path>,
        disassembler: Dis,
        breakpoints: Vec<Adr>,
        flags: Flags,
    ) -> Result<Self> {
        let mut cpu = CPU {
            disassembler,
            breakpoints,
            flags,
            ..Default::default()
        };
        // load the provided rom
        cpu.load_program(rom)?;
        Ok(cpu)
    }

    /// Loads a program from a file into the CPU's program space
    pub fn load_program(&mut self, rom: impl AsRef<Path>) -> Result<&mut Self> {
        self.load_program_bytes(&std::fs::read(rom)?)
    }

    /// Loads a program from any [Read]er into the CPU's program space
    ///
    /// Reads at most one byte more than program memory holds, so an endless
    /// source is reported as [Error::RomTooLarge].
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_from(&b"\x00\xe0"[..]).unwrap();
    /// assert!(cpu.load_program_from(std::io::repeat(0)).is_err());
    /// ```
    pub fn load_program_from(&mut self, rom: impl Read) -> Result<&mut Self> {
        let capacity = self.mem.get_region(Program).map_or(0, <[u8]>::len);
        let mut buf = Vec::with_capacity(capacity);
        rom.take(capacity as u64 + 1).read_to_end(&mut buf)?;
        self.load_program_bytes(&buf)
    }

    /// Loads bytes into the CPU's program space
    ///
    /// If the program doesn't fit, returns [Error::RomTooLarge] and memory is unchanged.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[0x00, 0xe0]).unwrap();
    /// assert_eq!(0x00e0, cpu.mem().read_word(0x200u16).unwrap());
    ///
    /// let too_big = [0xff; 0x1000 - 0x200 + 1];
    /// assert!(cpu.load_program_bytes(&too_big).is_err());
    /// assert_eq!(0x00e0, cpu.mem().read_word(0x200u16).unwrap());
    /// ```
    pub fn load_program_bytes(&mut self, rom: &[u8]) -> Result<&mut Self> {
        self.mem.load_region(Program, rom)?;
        info!("loaded {} byte program at {PROGRAM_ADDR:03x}", rom.len());
        Ok(self)
    }

    /// Sets a general purpose register in the CPU.
    /// If the register doesn't exist, returns [Error::InvalidRegister]
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// // Create a new CPU, and set v4 to 0x41
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x4, 0x41).unwrap();
    /// // Dump the CPU registers
    /// cpu.dump();
    /// ```
    pub fn set_v(&mut self, reg: Reg, value: u8) -> Result<()> {
        if let Some(gpr) = self.v.get_mut(reg) {
            *gpr = value;
            Ok(())
        } else {
            Err(Error::InvalidRegister { reg })
        }
    }

    /// Gets a slice of the entire general purpose registers
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// // Create a new CPU, and set v0 to 0x41
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x0, 0x41).unwrap();
    /// assert_eq!(
    ///     cpu.v(),
    ///     [0x41, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    /// )
    /// ```
    pub fn v(&self) -> &[u8] {
        self.v.as_slice()
    }

    /// Gets the program counter
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn pc(&self) -> Adr {
        self.pc
    }

    /// Gets the I register
    pub fn i(&self) -> Adr {
        self.i
    }

    /// Sets the I register. Addresses past `0xfff` are [Error::InvalidAddressRange].
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.set_i(0x300).unwrap();
    /// assert_eq!(0x300, cpu.i());
    /// assert!(cpu.set_i(0x1000).is_err());
    /// ```
    pub fn set_i(&mut self, addr: Adr) -> Result<()> {
        if addr > ADDR_MAX {
            return Err(Error::InvalidAddressRange {
                range: addr as usize..addr as usize + 1,
            });
        }
        self.i = addr;
        Ok(())
    }

    /// Gets the stack pointer: the number of return addresses on the stack
    pub fn sp(&self) -> usize {
        self.sp
    }

    /// Gets the return addresses currently on the stack, oldest first
    pub fn stack(&self) -> &[Adr] {
        &self.stack[..self.sp]
    }

    /// Gets the value in the Sound Timer register
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0, cpu.sound());
    /// ```
    pub fn sound(&self) -> u8 {
        self.sound
    }

    /// Gets the value in the Delay Timer register
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0, cpu.delay());
    /// ```
    pub fn delay(&self) -> u8 {
        self.delay
    }

    /// Gets the number of cycles the CPU has executed
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// Gets the CPU's memory
    pub fn mem(&self) -> &Mem {
        &self.mem
    }

    /// Gets the screen
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Soft resets the CPU, unpausing it and
    /// reinitializing the program counter to 0x200
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// let keys = Keypad::new();
    /// cpu.load_program_bytes(b"\x13\x40").unwrap();
    /// cpu.tick(&keys).unwrap();
    /// cpu.flags.pause = true;
    /// assert_eq!(0x340, cpu.pc());
    /// cpu.soft_reset();
    /// assert_eq!(0x200, cpu.pc());
    /// assert_eq!(false, cpu.flags.pause);
    /// ```
    pub fn soft_reset(&mut self) {
        self.pc = PROGRAM_ADDR;
        self.flags.pause = false;
    }

    /// Resets the emulator.
    ///
    /// Touches the pause flag, stack, pc, registers, timers, screen, and cycle count.
    ///
    /// Does not touch memory, [Dis], debug mode, or breakpoints.
    pub fn reset(&mut self) {
        self.flags.pause = false;
        // clear the stack
        self.stack = [0; STACK_DEPTH];
        self.sp = 0;
        // Reset the program counter
        self.pc = PROGRAM_ADDR;
        // Zero the registers
        self.i = 0;
        self.v = [0; 16];
        self.delay = 0;
        self.sound = 0;
        self.screen.clear();
        // Execution data
        self.cycle = 0;
    }

    /// Set a breakpoint
    pub fn set_break(&mut self, point: Adr) -> &mut Self {
        if !self.breakpoints.contains(&point) {
            self.breakpoints.push(point)
        }
        self
    }

    /// Unset a breakpoint
    pub fn unset_break(&mut self, point: Adr) -> &mut Self {
        self.breakpoints.retain(|&bp| bp != point);
        self
    }

    /// Gets a slice of breakpoints
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let cpu = CPU::default();
    /// assert_eq!(cpu.breakpoints(), &[]);
    /// ```
    pub fn breakpoints(&self) -> &[Adr] {
        self.breakpoints.as_slice()
    }

    /// Unpauses the emulator for a single tick,
    /// even if cpu.flags.pause is set.
    ///
    /// Like with [CPU::tick], this returns any [Error] raised by the instruction.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// cpu.flags.pause = true;
    /// cpu.singlestep(&Keypad::new()).unwrap();
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(1, cpu.cycle());
    /// assert!(cpu.flags.pause);
    /// ```
    pub fn singlestep(&mut self, keys: &Keypad) -> Result<&mut Self> {
        self.flags.pause = false;
        let result = self.tick(keys).map(|_| ());
        self.flags.pause = true;
        result.map(|_| self)
    }

    /// Runs `steps` ticks, stopping at the first error
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// cpu.multistep(&Keypad::new(), 0x20)
    ///     .expect("The program should only have valid opcodes.");
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(0x20, cpu.cycle());
    /// ```
    pub fn multistep(&mut self, keys: &Keypad, steps: usize) -> Result<&mut Self> {
        for _ in 0..steps {
            self.tick(keys)?;
        }
        Ok(self)
    }

    /// Executes a single cycle: fetch, decode, execute, then tick both timers
    ///
    /// The pc is advanced past the instruction *before* it executes.
    /// Unrecognized instructions are logged, and otherwise skipped.
    ///
    /// Returns [Error::BreakpointHit] if a breakpoint was hit after the instruction executed.
    /// This result contains information about the breakpoint, but can be safely ignored.
    ///
    /// Any other [Error] halts the program: pc is rewound to the offending
    /// instruction, the CPU is paused, and neither the timers nor the cycle
    /// count advance.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// cpu.tick(&Keypad::new())
    ///     .expect("0x00e0 (cls) should be a valid opcode.");
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(1, cpu.cycle());
    /// ```
    /// Returning with an empty stack halts the program.
    /// ```rust
    /// # use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program_bytes(&[0x00, 0xee]).unwrap();
    /// cpu.tick(&Keypad::new())
    ///     .expect_err("Should return Error::StackUnderflow { addr: 0x200 }");
    /// assert_eq!(0x200, cpu.pc());
    /// assert_eq!(0, cpu.cycle());
    /// assert!(cpu.flags.pause);
    /// ```
    pub fn tick(&mut self, keys: &Keypad) -> Result<&mut Self> {
        // Do nothing if paused
        if self.flags.pause {
            return Ok(self);
        }
        self.cycle += 1;
        let addr = self.pc;
        if let Err(e) = self.step(keys) {
            error!("halted at {addr:03x}: {e}");
            self.cycle -= 1;
            self.pc = addr;
            self.flags.pause = true;
            return Err(e);
        }
        self.tick_timers();

        // process breakpoints
        if !self.breakpoints.is_empty() && self.breakpoints.contains(&self.pc) {
            debug!("breakpoint hit at {:03x}", self.pc);
            self.flags.pause = true;
            return Err(Error::BreakpointHit {
                addr: self.pc,
                next: self.mem.read_word(self.pc).unwrap_or_default(),
            });
        }
        Ok(self)
    }

    /// Dumps the current state of all CPU registers, and the cycle count
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let cpu = CPU::default();
    /// cpu.dump();
    /// ```
    /// outputs
    /// ```text
    /// PC: 0200, SP: 0000, I: 0000
    /// v0: 00 v1: 00 v2: 00 v3: 00
    /// v4: 00 v5: 00 v6: 00 v7: 00
    /// v8: 00 v9: 00 vA: 00 vB: 00
    /// vC: 00 vD: 00 vE: 00 vF: 00
    /// DLY: 0, SND: 0, CYC:      0
    /// ```
    pub fn dump(&self) {
        std::println!(
            "PC: {:04x}, SP: {:04x}, I: {:04x}\n{}DLY: {}, SND: {}, CYC: {:6}",
            self.pc,
            self.sp,
            self.i,
            self.v
                .into_iter()
                .enumerate()
                .map(|(i, gpr)| {
                    format!(
                        "v{i:X}: {gpr:02x} {}",
                        match i % 4 {
                            3 => "\n",
                            _ => "",
                        }
                    )
                })
                .collect::<String>(),
            self.delay,
            self.sound,
            self.cycle,
        );
    }
}

// cycle internals
impl CPU {
    /// Fetches, decodes, and executes the instruction at pc
    fn step(&mut self, keys: &Keypad) -> Result<()> {
        let opcode = self.mem.read_word(self.pc)?;

        // Print opcode disassembly:
        if self.flags.debug {
            std::println!(
                "{:3} {}",
                self.cycle.bright_black(),
                self.disassembler.at(self.pc, opcode)
            );
        }

        let addr = self.pc;
        self.pc = self.pc.wrapping_add(2);
        match Insn::decode(&opcode.to_be_bytes()) {
            Ok((_, insn)) => self.execute(insn, keys),
            Err(_) => {
                warn!(
                    "opcode {opcode:04x} ({:x}xxx) at {addr:03x} not recognized",
                    opcode >> 12
                );
                Ok(())
            }
        }
    }

    /// Counts both timers down by one, stopping at zero
    fn tick_timers(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        if self.sound == 1 {
            debug!("beep");
        }
        self.sound = self.sound.saturating_sub(1);
    }
}

impl Debug for CPU {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CPU")
            .field("flags", &self.flags)
            .field("stack", &self.stack())
            .field("pc", &self.pc)
            .field("i", &self.i)
            .field("v", &self.v)
            .field("delay", &self.delay)
            .field("sound", &self.sound)
            .field("cycle", &self.cycle)
            .field("breakpoints", &self.breakpoints)
            .finish_non_exhaustive()
    }
}

impl Default for CPU {
    /// Constructs a new CPU with sane defaults
    ///
    /// | value  | default | description
    /// |--------|---------|------------
    /// | font   |`0x0050` | Location of font memory.
    /// | pc     |`0x0200` | Start location.
    ///
    /// # Examples
    /// ```rust
    /// use chip8vm::*;
    /// let mut cpu = CPU::default();
    /// ```
    fn default() -> Self {
        CPU {
            flags: Flags::default(),
            mem: Mem::new(),
            screen: Screen::new(),
            stack: [0; STACK_DEPTH],
            sp: 0,
            pc: PROGRAM_ADDR,
            i: 0,
            v: [0; 16],
            delay: 0,
            sound: 0,
            cycle: 0,
            breakpoints: vec![],
            disassembler: Dis::default(),
        }
    }
}
