// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! A snapshot of the 16-key hexadecimal keypad

use crate::error::{Error, Result};

/// Which of the 16 keys are currently held.
///
/// Owned by whatever polls the host's input, and handed to
/// [crate::CPU::tick] each cycle. The CPU only ever reads it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keypad {
    keys: [bool; 16],
}

impl Keypad {
    /// Constructs a keypad with no keys held
    pub fn new() -> Self {
        Self::default()
    }

    /// Presses a key, and reports whether the key's state changed.
    /// If key does not exist, returns [Error::InvalidKey].
    ///
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut keypad = Keypad::new();
    ///
    /// // press key `7`
    /// let did_press = keypad.press(0x7).unwrap();
    /// assert!(did_press);
    ///
    /// // press key `7` again, even though it's already pressed
    /// let did_press = keypad.press(0x7).unwrap();
    /// // it was already pressed, so nothing's changed.
    /// assert!(!did_press);
    /// ```
    pub fn press(&mut self, key: usize) -> Result<bool> {
        self.set(key, true)
    }

    /// Releases a key, and reports whether the key's state changed.
    /// If key is outside range `0..=0xF`, returns [Error::InvalidKey].
    ///
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut keypad = Keypad::new();
    /// // press key `7`
    /// keypad.press(0x7).unwrap();
    /// // release key `7`
    /// let changed = keypad.release(0x7).unwrap();
    /// assert!(changed); // key released
    /// // try releasing `7` again
    /// let changed = keypad.release(0x7).unwrap();
    /// assert!(!changed); // key was not held
    /// ```
    pub fn release(&mut self, key: usize) -> Result<bool> {
        self.set(key, false)
    }

    fn set(&mut self, key: usize, down: bool) -> Result<bool> {
        let keyref = self.keys.get_mut(key).ok_or(Error::InvalidKey { key })?;
        let changed = *keyref != down;
        *keyref = down;
        Ok(changed)
    }

    /// Reports whether `key` is held. If key does not exist, returns [Error::InvalidKey].
    pub fn is_pressed(&self, key: usize) -> Result<bool> {
        self.keys
            .get(key)
            .copied()
            .ok_or(Error::InvalidKey { key })
    }

    /// Gets the lowest-numbered key that's held, if any
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut keypad = Keypad::new();
    /// assert_eq!(None, keypad.first_pressed());
    /// keypad.press(0xc).unwrap();
    /// keypad.press(0x3).unwrap();
    /// assert_eq!(Some(0x3), keypad.first_pressed());
    /// ```
    pub fn first_pressed(&self) -> Option<usize> {
        self.keys.iter().position(|&down| down)
    }

    /// Gets the state of every key, indexed by key
    pub fn as_slice(&self) -> &[bool] {
        &self.keys
    }

    /// Maps a key on a QWERTY keyboard to the hex key in the same position
    ///
    /// ```text
    /// Keypad       Keyboard
    /// |1|2|3|C|    |1|2|3|4|
    /// |4|5|6|D|    |Q|W|E|R|
    /// |7|8|9|E| => |A|S|D|F|
    /// |A|0|B|F|    |Z|X|C|V|
    /// ```
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// assert_eq!(Some(0xc), Keypad::map_qwerty('4'));
    /// assert_eq!(Some(0x0), Keypad::map_qwerty('X'));
    /// assert_eq!(None, Keypad::map_qwerty('p'));
    /// ```
    pub fn map_qwerty(key: char) -> Option<usize> {
        Some(match key.to_ascii_lowercase() {
            '1' => 0x1,
            '2' => 0x2,
            '3' => 0x3,
            '4' => 0xc,
            'q' => 0x4,
            'w' => 0x5,
            'e' => 0x6,
            'r' => 0xd,
            'a' => 0x7,
            's' => 0x8,
            'd' => 0x9,
            'f' => 0xe,
            'z' => 0xa,
            'x' => 0x0,
            'c' => 0xb,
            'v' => 0xf,
            _ => return None,
        })
    }
}

impl From<[bool; 16]> for Keypad {
    fn from(keys: [bool; 16]) -> Self {
        Keypad { keys }
    }
}
