// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Error type for the Chip-8 virtual machine

use crate::cpu::mem::Region;
use std::ops::Range;
use thiserror::Error;

/// Result type, equivalent to [std::result::Result]<T, [enum@Error]>
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the Chip-8 virtual machine.
///
/// Everything but [Error::BreakpointHit] halts the running program when
/// returned from [crate::CPU::tick].
#[derive(Debug, Error)]
pub enum Error {
    /// Represents a breakpoint being hit
    #[error("breakpoint hit: {addr:03x} ({next:04x})")]
    BreakpointHit {
        /// The address of the breakpoint
        addr: u16,
        /// The instruction after the breakpoint
        next: u16,
    },
    /// Tried to access memory outside the 4096-byte address space
    #[error("range {range:04x?} is not present in memory")]
    InvalidAddressRange {
        /// The offending range
        range: Range<usize>,
    },
    /// A call was issued with all 16 stack slots in use
    #[error("call at {addr:03x} overflows the stack")]
    StackOverflow {
        /// Address of the offending `call`
        addr: u16,
    },
    /// A return was issued with an empty stack
    #[error("return at {addr:03x} underflows the stack")]
    StackUnderflow {
        /// Address of the offending `ret`
        addr: u16,
    },
    /// The program does not fit in program memory
    #[error("program of {size} bytes does not fit in {capacity} bytes of program memory")]
    RomTooLarge {
        /// Length of the rejected program
        size: usize,
        /// Space available
        capacity: usize,
    },
    /// The region you asked for was not defined
    #[error("region {region} is not present in memory")]
    MissingRegion {
        /// The offending [Region]
        region: Region,
    },
    /// Tried to press (or test) a key that doesn't exist
    #[error("tried to access key {key:X} which does not exist")]
    InvalidKey {
        /// The offending key
        key: usize,
    },
    /// Tried to get/set an out-of-bounds register
    #[error("tried to access register v{reg:X} which does not exist")]
    InvalidRegister {
        /// The offending register
        reg: usize,
    },
    /// Error originated in [std::io]
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}
