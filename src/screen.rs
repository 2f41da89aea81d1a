// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Stores and displays the Chip-8's screen memory

use std::fmt::{Display, Formatter, Result};

/// Width of the display, in pixels
pub const WIDTH: usize = 64;
/// Height of the display, in pixels
pub const HEIGHT: usize = 32;

/// The monochrome 64×32 display buffer.
///
/// Only [Screen::clear] and [Screen::draw] mutate it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Screen {
    pixels: Vec<bool>,
}

impl Default for Screen {
    fn default() -> Self {
        Screen {
            pixels: vec![false; WIDTH * HEIGHT],
        }
    }
}

impl Screen {
    /// Constructs a new, cleared screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets every pixel, in row-major order. `true` is "on".
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Gets the pixel at (`x`, `y`), or [None] if it's off the screen
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let screen = Screen::new();
    /// assert_eq!(Some(false), screen.get(63, 31));
    /// assert_eq!(None, screen.get(64, 0));
    /// ```
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        if x < WIDTH && y < HEIGHT {
            Some(self.pixels[y * WIDTH + x])
        } else {
            None
        }
    }

    /// Turns every pixel off
    pub fn clear(&mut self) {
        self.pixels.fill(false)
    }

    /// XORs an 8-pixel-wide sprite onto the screen, and reports whether any
    /// "on" pixel was turned off.
    ///
    /// The origin wraps around the screen, but the sprite itself is clipped
    /// at the right and bottom edges.
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut screen = Screen::new();
    /// // (66, 33) wraps to (2, 1)
    /// assert!(!screen.draw(66, 33, &[0x80]));
    /// assert_eq!(Some(true), screen.get(2, 1));
    /// // Drawing it again erases it, and collides
    /// assert!(screen.draw(2, 1, &[0x80]));
    /// assert_eq!(Some(false), screen.get(2, 1));
    /// ```
    pub fn draw(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let (x, y) = (x as usize % WIDTH, y as usize % HEIGHT);
        let mut collision = false;
        for (row, &line) in sprite.iter().enumerate().take(HEIGHT - y) {
            for col in 0..(WIDTH - x).min(8) {
                if line & (0x80 >> col) == 0 {
                    continue;
                }
                let pixel = &mut self.pixels[(y + row) * WIDTH + x + col];
                collision |= *pixel;
                *pixel ^= true;
            }
        }
        collision
    }

    /// Packs the screen at 1bpp, 8 bytes per row, most significant bit leftmost
    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(8)
            .map(|bits| bits.iter().fold(0u8, |byte, &bit| byte << 1 | bit as u8))
            .collect()
    }

    /// Prints the screen to stdout
    pub fn print_screen(&self) {
        // draw with the drawille library, if available
        #[cfg(feature = "drawille")]
        {
            use drawille::Canvas;
            let mut canvas = Canvas::new(WIDTH as u32, HEIGHT as u32);
            self.pixels
                .iter()
                .enumerate()
                .filter(|(_, on)| **on)
                .for_each(|(index, _)| {
                    canvas.set((index % WIDTH) as u32, (index / WIDTH) as u32)
                });
            println!("{}", canvas.frame());
        }
        #[cfg(not(feature = "drawille"))]
        print!("{self}");
    }
}

impl Display for Screen {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for (y, row) in self.pixels.chunks_exact(WIDTH).enumerate() {
            write!(f, "{y:02}|")?;
            for &on in row {
                write!(f, "{}", if on { '█' } else { ' ' })?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}
