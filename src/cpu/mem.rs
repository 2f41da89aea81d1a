// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The Mem represents the CPU's memory
//!
//! Every access is range-checked against the backing memory, and fails with
//! [Error::InvalidAddressRange] instead of wrapping.

use crate::error::{Error, Result};
use std::{
    fmt::{Display, Formatter},
    ops::Range,
};

/// Total size of the address space
pub const MEM_SIZE: usize = 0x1000;
/// Location of the built-in font
pub const FONT_ADDR: u16 = 0x050;
/// Origin of program memory. Execution starts here.
pub const PROGRAM_ADDR: u16 = 0x200;

/// Hexadecimal digit glyphs `0`..=`F`, 5 bytes each
#[rustfmt::skip]
pub const FONT: [u8; 80] = [
    0xf0, 0x90, 0x90, 0x90, 0xf0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xf0, 0x10, 0xf0, 0x80, 0xf0, // 2
    0xf0, 0x10, 0xf0, 0x10, 0xf0, // 3
    0x90, 0x90, 0xf0, 0x10, 0x10, // 4
    0xf0, 0x80, 0xf0, 0x10, 0xf0, // 5
    0xf0, 0x80, 0xf0, 0x90, 0xf0, // 6
    0xf0, 0x10, 0x20, 0x40, 0x40, // 7
    0xf0, 0x90, 0xf0, 0x90, 0xf0, // 8
    0xf0, 0x90, 0xf0, 0x10, 0xf0, // 9
    0xf0, 0x90, 0xf0, 0x90, 0x90, // A
    0xe0, 0x90, 0xe0, 0x90, 0xe0, // B
    0xf0, 0x80, 0x80, 0x80, 0xf0, // C
    0xe0, 0x90, 0x90, 0x90, 0xe0, // D
    0xf0, 0x80, 0xf0, 0x80, 0xf0, // E
    0xf0, 0x80, 0xf0, 0x80, 0x80, // F
];

/// Creates a new [Mem], growing as needed
/// # Examples
/// ```rust
/// # use chip8vm::*;
/// let mem = mem! {
///     Region::Charset [0x0050..0x00a0] = &FONT,
///     Region::Program [0x0200..0x1000] = b"\x00\xe0",
/// };
/// assert_eq!(0x1000, mem.len());
/// ```
#[macro_export]
macro_rules! mem {
    ($($name:path $(:)? [$range:expr] $(= $data:expr)?) ,* $(,)?) => {
        $crate::cpu::mem::Mem::default()
        $(
            .add_region_owned($name, $range)
            $(
                .load_region_owned($name, $data)
            )?
        )*
    };
}

/// Represents a named region in memory
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Region {
    /// Font glyphs. Written once, at construction.
    Charset,
    /// Program memory
    Program,
    #[doc(hidden)]
    /// Total number of named regions
    Count,
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Region::Charset => "Charset",
                Region::Program => "Program",
                _ => "",
            }
        )
    }
}

/// Stores memory in a series of named regions with ranges
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mem {
    memory: Vec<u8>,
    region: [Option<Range<usize>>; Region::Count as usize],
}

impl Mem {
    /// Constructs the standard Chip-8 memory map: 4 KiB, font at `0x050`,
    /// program memory from `0x200` to the end.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mem = Mem::new();
    /// assert_eq!(MEM_SIZE, mem.len());
    /// assert_eq!(0xf0, mem.read(0x050u16).unwrap());
    /// ```
    pub fn new() -> Self {
        mem! {
            Region::Charset [FONT_ADDR as usize..FONT_ADDR as usize + FONT.len()] = &FONT,
            Region::Program [PROGRAM_ADDR as usize..MEM_SIZE],
        }
    }

    /// Gets the length of the backing memory
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Returns true if the backing memory contains no elements
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Grows the backing memory to at least size bytes, but does not truncate
    fn with_size(&mut self, size: usize) {
        if self.len() < size {
            self.memory.resize(size, 0);
        }
    }

    /// Adds a new named range ([Region]) to an owned [Mem]
    pub fn add_region_owned(mut self, name: Region, range: Range<usize>) -> Self {
        self.add_region(name, range);
        self
    }

    /// Adds a new named range ([Region]) to a [Mem]
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut mem = Mem::default();
    /// mem.add_region(Region::Program, 0..1234);
    /// assert_eq!(1234, mem.len());
    /// ```
    pub fn add_region(&mut self, name: Region, range: Range<usize>) -> &mut Self {
        self.with_size(range.end);
        if let Some(region) = self.region.get_mut(name as usize) {
            *region = Some(range);
        }
        self
    }

    /// Loads data into a [Region] on an *owned* [Mem], for use during initialization
    pub fn load_region_owned(mut self, name: Region, data: &[u8]) -> Self {
        self.load_region(name, data).ok();
        self
    }

    /// Replaces the contents of a named [Region] with `data`, zero-filling the rest.
    ///
    /// If `data` does not fit, returns [Error::RomTooLarge] and leaves memory untouched.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// # fn main() -> Result<()> {
    /// let mut mem = Mem::default().add_region_owned(Region::Program, 0..4);
    /// mem.load_region(Region::Program, b"\x12\x34")?;
    /// assert_eq!(&[0x12, 0x34, 0, 0], mem.get_region(Region::Program).unwrap());
    /// assert!(mem.load_region(Region::Program, b"too long").is_err());
    /// #    Ok(())
    /// # }
    /// ```
    pub fn load_region(&mut self, name: Region, data: &[u8]) -> Result<&mut Self> {
        let region = self
            .get_region_mut(name)
            .ok_or(Error::MissingRegion { region: name })?;
        if data.len() > region.len() {
            return Err(Error::RomTooLarge {
                size: data.len(),
                capacity: region.len(),
            });
        }
        region.fill(0);
        region[..data.len()].copy_from_slice(data);
        Ok(self)
    }

    /// Fills a [Region] with zeroes. If the region doesn't exist, that's okay.
    pub fn clear_region(&mut self, name: Region) -> &mut Self {
        if let Some(region) = self.get_region_mut(name) {
            region.fill(0)
        }
        self
    }

    /// Gets a slice of a named [Region] of memory
    pub fn get_region(&self, name: Region) -> Option<&[u8]> {
        self.memory.get(self.region.get(name as usize)?.clone()?)
    }

    /// Gets a mutable slice of a named [Region] of memory
    pub fn get_region_mut(&mut self, name: Region) -> Option<&mut [u8]> {
        self.memory.get_mut(self.region.get(name as usize)?.clone()?)
    }

    /// Gets the slice at `range`, or [Error::InvalidAddressRange]
    pub fn get(&self, range: Range<usize>) -> Result<&[u8]> {
        self.memory
            .get(range.clone())
            .ok_or(Error::InvalidAddressRange { range })
    }

    /// Gets the mutable slice at `range`, or [Error::InvalidAddressRange]
    pub fn get_mut(&mut self, range: Range<usize>) -> Result<&mut [u8]> {
        self.memory
            .get_mut(range.clone())
            .ok_or(Error::InvalidAddressRange { range })
    }

    /// Reads the byte at `addr`
    pub fn read(&self, addr: impl Into<usize>) -> Result<u8> {
        let addr = addr.into();
        Ok(self.get(addr..addr + 1)?[0])
    }

    /// Writes `data` to `addr`
    pub fn write(&mut self, addr: impl Into<usize>, data: u8) -> Result<()> {
        let addr = addr.into();
        self.get_mut(addr..addr + 1)?[0] = data;
        Ok(())
    }

    /// Reads the big-endian word at `addr`
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// # fn main() -> Result<()> {
    /// let mut mem = Mem::new();
    /// mem.load_region(Region::Program, b"\xa2\xf0")?;
    /// assert_eq!(0xa2f0, mem.read_word(0x200u16)?);
    /// // The second byte would be at 0x1000
    /// assert!(mem.read_word(0xfffu16).is_err());
    /// #    Ok(())
    /// # }
    /// ```
    pub fn read_word(&self, addr: impl Into<usize>) -> Result<u16> {
        let addr = addr.into();
        let bytes = self.get(addr..addr + 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }
}
