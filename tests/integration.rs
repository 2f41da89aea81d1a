//! Testing methods on chip8vm's public API
use chip8vm::*;
use std::{collections::hash_map::DefaultHasher, hash::Hash};

/// Builds a CPU with `program` loaded
fn load(program: &[u8]) -> CPU {
    let mut cpu = CPU::default();
    cpu.load_program_bytes(program)
        .expect("test programs should fit in program memory");
    cpu
}

#[test]
fn cpu() {
    let cpu = CPU::default(); // Default
    let cpu2 = cpu.clone(); // Clone
    assert_eq!(cpu, cpu2); // PartialEq
    println!("{cpu:?}"); // Debug
}

mod programs {
    use super::*;

    #[test]
    fn bcd() -> Result<()> {
        // ld v0, #9c; ld I, $300; ld B, v0
        let mut cpu = load(b"\x60\x9c\xa3\x00\xf0\x33");
        cpu.multistep(&Keypad::new(), 3)?;
        assert_eq!(&[1, 5, 6], cpu.mem().get(0x300..0x303)?);
        assert_eq!(0x206, cpu.pc());
        Ok(())
    }

    #[test]
    fn draw_zero_glyph() -> Result<()> {
        // ld v0, #00; ld F, v0; drw v0, v0, #5
        let mut cpu = load(b"\x60\x00\xf0\x29\xd0\x05");
        cpu.multistep(&Keypad::new(), 3)?;
        assert_eq!(0, cpu.v()[0xf]);
        let expected = ["####", "#  #", "#  #", "#  #", "####"];
        for (y, row) in expected.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                assert_eq!(Some(c == '#'), cpu.screen().get(x, y), "pixel ({x}, {y})");
            }
            assert_eq!(Some(false), cpu.screen().get(4, y));
        }
        Ok(())
    }

    #[test]
    fn call_then_return() -> Result<()> {
        // 200: call 206; 202: jp 202; 204: (pad); 206: ret
        let mut cpu = load(b"\x22\x06\x12\x02\x00\x00\x00\xee");
        let keys = Keypad::new();
        cpu.tick(&keys)?;
        assert_eq!((0x206, 1), (cpu.pc(), cpu.sp()));
        assert_eq!(&[0x202u16], cpu.stack());
        cpu.tick(&keys)?;
        assert_eq!((0x202, 0), (cpu.pc(), cpu.sp()));
        Ok(())
    }

    #[test]
    fn xor_is_self_inverse() -> Result<()> {
        // ld I, $050; drw v0, v0, #5; drw v0, v0, #5
        let mut cpu = load(b"\xa0\x50\xd0\x05\xd0\x05");
        cpu.multistep(&Keypad::new(), 3)?;
        assert_eq!(1, cpu.v()[0xf]);
        assert_eq!(&Screen::new(), cpu.screen());
        Ok(())
    }

    #[test]
    fn wait_for_key() -> Result<()> {
        // ld v3, K
        let mut cpu = load(b"\xf3\x0a");
        let mut keys = Keypad::new();
        let regs = cpu.v().to_vec();
        cpu.multistep(&keys, 5)?;
        assert_eq!(0x200, cpu.pc());
        assert_eq!(regs, cpu.v());
        keys.press(0xb)?;
        cpu.tick(&keys)?;
        assert_eq!(0x202, cpu.pc());
        assert_eq!(0xb, cpu.v()[3]);
        Ok(())
    }

    #[test]
    fn delay_loop() -> Result<()> {
        // ld v0, #03; ld DT, v0; loop: ld v1, DT; se v1, #00; jp loop; jp self
        let mut cpu = load(b"\x60\x03\xf0\x15\xf1\x07\x31\x00\x12\x04\x12\x0a");
        cpu.multistep(&Keypad::new(), 20)?;
        assert_eq!(0x20a, cpu.pc());
        assert_eq!(0, cpu.delay());
        Ok(())
    }

    #[test]
    fn stack_overflow_halts() {
        // call 200, forever
        let mut cpu = load(b"\x22\x00");
        let keys = Keypad::new();
        cpu.multistep(&keys, STACK_DEPTH).unwrap();
        assert!(matches!(
            cpu.tick(&keys),
            Err(Error::StackOverflow { addr: 0x200 })
        ));
        assert_eq!(STACK_DEPTH, cpu.sp());
        assert_eq!(STACK_DEPTH, cpu.cycle());
        assert!(cpu.flags.pause);
        // while paused, ticking does nothing
        let cycle = cpu.cycle();
        cpu.multistep(&keys, 10).unwrap();
        assert_eq!(cycle, cpu.cycle());
    }

    #[test]
    fn unknown_opcode_is_skipped() -> Result<()> {
        let mut cpu = load(b"\x80\x0f\x61\x01");
        cpu.multistep(&Keypad::new(), 2)?;
        assert_eq!(0x204, cpu.pc());
        assert_eq!(1, cpu.v()[1]);
        Ok(())
    }

    #[test]
    fn fetch_wraps_nowhere() {
        // jp fff
        let mut cpu = load(b"\x1f\xff");
        let keys = Keypad::new();
        cpu.tick(&keys).unwrap();
        assert!(matches!(
            cpu.tick(&keys),
            Err(Error::InvalidAddressRange { .. })
        ));
        assert_eq!(0xfff, cpu.pc());
    }

    #[test]
    fn indexed_jump_does_not_wrap() {
        // ld v0, #ff; jp v0, $fff
        let mut cpu = load(b"\x60\xff\xbf\xff");
        let keys = Keypad::new();
        cpu.multistep(&keys, 2).unwrap();
        assert!(matches!(
            cpu.tick(&keys),
            Err(Error::InvalidAddressRange { .. })
        ));
        assert_eq!(0x10fe, cpu.pc());
        assert_eq!(2, cpu.cycle());
    }
}

mod cpu {
    use super::*;

    #[test]
    fn set_break() {
        let mut cpu = CPU::default();
        let point = 0x234;
        assert_eq!(cpu.breakpoints(), &[]);
        // Attempt to set the same breakpoint 100 times
        for _ in 0..100 {
            cpu.set_break(point);
        }
        assert_eq!(cpu.breakpoints(), &[point]);
    }
    #[test]
    fn unset_break() {
        let mut cpu = CPU::default();
        let point = 0x234;
        // set TWO breakpoints
        cpu.set_break(point + 1);
        cpu.set_break(point);
        assert_eq!(cpu.breakpoints(), &[point + 1, point]);
        // Attempt to unset the same breakpoint 100 times
        for _ in 0..100 {
            cpu.unset_break(point);
        }
        // Only unset the matching point
        assert_eq!(cpu.breakpoints(), &[point + 1]);
    }
    #[test]
    fn breakpoint_then_singlestep() {
        let mut cpu = load(b"\x00\xe0\x00\xe0\x00\xe0");
        let keys = Keypad::new();
        cpu.set_break(0x202);
        assert!(matches!(
            cpu.multistep(&keys, 3),
            Err(Error::BreakpointHit { addr: 0x202, next: 0x00e0 })
        ));
        assert!(cpu.flags.pause);
        cpu.singlestep(&keys).unwrap();
        assert_eq!(0x204, cpu.pc());
        assert!(cpu.flags.pause);
    }

    #[test]
    fn set_invalid_reg() {
        let mut cpu = CPU::default();
        let cpu2 = cpu.clone();
        cpu.set_v(0x21345134, 0xff)
            .expect_err("This should produce an Error::InvalidRegister");
        // no change has been made
        assert_eq!(cpu, cpu2);
    }

    #[test]
    fn rom_too_large() {
        let mut cpu = load(b"\x12\x00");
        let cpu2 = cpu.clone();
        assert!(matches!(
            cpu.load_program_bytes(&[0; MEM_SIZE]),
            Err(Error::RomTooLarge { size: MEM_SIZE, capacity: 0xe00 })
        ));
        assert_eq!(cpu, cpu2);
    }

    #[test]
    fn rom_fits_exactly() -> Result<()> {
        let mut cpu = CPU::default();
        cpu.load_program_bytes(&[0xa5; 0xe00])?;
        assert_eq!(0xa5, cpu.mem().read(0xfffu16)?);
        Ok(())
    }

    #[test]
    fn load_from_file() -> Result<()> {
        let path = std::env::temp_dir().join("chip8vm-load_from_file.ch8");
        std::fs::write(&path, b"\x60\x2a")?;
        let mut cpu = CPU::new(&path, Dis::default(), vec![0x202], Flags::default())?;
        std::fs::remove_file(&path)?;
        assert!(matches!(
            cpu.tick(&Keypad::new()),
            Err(Error::BreakpointHit { addr: 0x202, .. })
        ));
        assert_eq!(0x2a, cpu.v()[0]);
        Ok(())
    }

    #[test]
    fn load_missing_file() {
        assert!(matches!(
            CPU::new(
                "this/file/does/not/exist.ch8",
                Dis::default(),
                vec![],
                Flags::default()
            ),
            Err(Error::IoError(_))
        ));
    }

    #[test]
    fn reset() -> Result<()> {
        let mut cpu = load(b"\x60\xff\xf0\x15\xa3\x00\xd0\x01\x22\x00");
        cpu.set_break(0x300);
        cpu.multistep(&Keypad::new(), 5)?;
        cpu.reset();
        let mut fresh = load(b"\x60\xff\xf0\x15\xa3\x00\xd0\x01\x22\x00");
        fresh.set_break(0x300);
        assert_eq!(fresh, cpu);
        Ok(())
    }

    #[test]
    fn soft_reset_keeps_registers() -> Result<()> {
        let mut cpu = load(b"\x60\x42\x12\x02");
        cpu.multistep(&Keypad::new(), 3)?;
        cpu.soft_reset();
        assert_eq!(0x200, cpu.pc());
        assert_eq!(0x42, cpu.v()[0]);
        Ok(())
    }

    mod flags {
        use super::*;
        //#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[test]
        fn clone() {
            let f1 = Flags {
                debug: true,
                pause: false,
            };
            let f2 = f1.clone();
            assert_eq!(f1, f2)
        }
        #[test]
        fn debug() {
            println!("{:?}", Flags::default());
        }
        #[test]
        fn default() {
            assert_eq!(
                Flags::default(),
                Flags {
                    debug: false,
                    pause: false,
                }
            )
        }
        #[test]
        fn ord() {
            let f1 = Flags::default();
            let f2 = Flags {
                debug: true,
                pause: true,
            };
            assert!(f1 < f2);
            assert_eq!(Flags::default(), f1.min(f2));
        }
        #[test]
        fn hash() {
            let mut hasher = DefaultHasher::new();
            Flags::default().hash(&mut hasher);
            println!("{:?}", hasher);
        }
    }
}

mod keypad {
    use super::*;

    #[test]
    fn press_invalid_key() {
        let mut keys = Keypad::new();
        assert!(matches!(
            keys.press(0x21345134),
            Err(Error::InvalidKey { key: 0x21345134 })
        ));
        // no change has been made, everything is safe.
        assert_eq!(Keypad::new(), keys);
    }

    #[test]
    fn release_invalid_key() {
        let mut keys = Keypad::new();
        keys.release(0x10)
            .expect_err("This should produce an Error::InvalidKey");
        assert!(keys.is_pressed(0x10).is_err());
    }

    #[test]
    fn from_array() -> Result<()> {
        let mut held = [false; 16];
        held[0xa] = true;
        let keys = Keypad::from(held);
        assert!(keys.is_pressed(0xa)?);
        assert_eq!(Some(0xa), keys.first_pressed());
        assert_eq!(&held, keys.as_slice());
        Ok(())
    }

    #[test]
    fn qwerty_covers_every_key() {
        let mut seen: Vec<_> = "1234qwerasdfzxcv"
            .chars()
            .filter_map(Keypad::map_qwerty)
            .collect();
        seen.sort_unstable();
        assert_eq!((0..16usize).collect::<Vec<_>>(), seen);
    }

    #[test]
    fn key_number_above_f_halts() {
        // ld v0, #10; skp v0
        let mut cpu = load(b"\x60\x10\xe0\x9e");
        let keys = Keypad::new();
        cpu.tick(&keys).unwrap();
        assert!(matches!(
            cpu.tick(&keys),
            Err(Error::InvalidKey { key: 0x10 })
        ));
        assert_eq!(0x202, cpu.pc());
    }
}

mod screen {
    use super::*;

    #[test]
    fn dimensions() {
        let screen = Screen::default();
        assert_eq!(WIDTH * HEIGHT, screen.pixels().len());
        assert_eq!(WIDTH * HEIGHT / 8, screen.to_bytes().len());
    }

    #[test]
    fn clip_bottom_right() {
        let mut screen = Screen::new();
        assert!(!screen.draw(62, 30, &[0xff, 0xff, 0xff]));
        assert_eq!(4, screen.pixels().iter().filter(|&&on| on).count());
        // nothing wrapped around to the far edges
        assert_eq!(Some(false), screen.get(0, 0));
        assert_eq!(Some(false), screen.get(0, 30));
        assert_eq!(Some(false), screen.get(62, 0));
    }

    #[test]
    fn display() {
        let mut screen = Screen::new();
        screen.draw(0, 0, &[0x80]);
        let text = screen.to_string();
        assert_eq!(HEIGHT, text.lines().count());
        assert!(text.starts_with("00|█ "));
    }

    #[test]
    fn clear() {
        let mut screen = Screen::new();
        screen.draw(10, 10, &[0xaa, 0x55]);
        screen.clear();
        assert_eq!(Screen::default(), screen);
    }
}

mod mem {
    use super::*;

    #[test]
    fn font_is_loaded() -> Result<()> {
        let mem = Mem::new();
        let start = FONT_ADDR as usize;
        assert_eq!(&FONT[..], mem.get(start..start + FONT.len())?);
        assert_eq!(Some(&FONT[..]), mem.get_region(Region::Charset));
        Ok(())
    }

    #[test]
    fn out_of_range() {
        let mut mem = Mem::new();
        assert!(mem.read(0x1000u16).is_err());
        assert!(mem.write(0x1000u16, 0).is_err());
        assert!(mem.read_word(0xfffu16).is_err());
        assert!(matches!(
            mem.get(0xff0..0x1010),
            Err(Error::InvalidAddressRange { .. })
        ));
    }

    #[test]
    fn missing_region() {
        let mut mem = Mem::default();
        assert!(matches!(
            mem.load_region(Region::Program, b"\x00\xe0"),
            Err(Error::MissingRegion { region: Region::Program })
        ));
        assert_eq!(None, mem.get_region(Region::Program));
    }

    #[test]
    fn region_display() {
        assert_eq!("Charset", Region::Charset.to_string());
        assert_eq!("Program", Region::Program.to_string());
    }

    #[test]
    fn clear_region() -> Result<()> {
        let mut mem = Mem::new();
        mem.load_region(Region::Program, b"\x12\x34")?;
        mem.clear_region(Region::Program);
        assert_eq!(0, mem.read_word(0x200u16)?);
        assert_eq!(0xf0, mem.read(FONT_ADDR)?);
        Ok(())
    }
}

mod dis {
    use super::*;
    use imperative_rs::InstructionSet;

    #[test]
    #[allow(clippy::clone_on_copy)]
    fn clone() {
        let opcode = Insn::decode(&[0xef, 0xa1]).unwrap().1; // random valid opcode
        let clone = opcode.clone();
        assert_eq!(opcode, clone);
    }

    #[test]
    fn decode() {
        assert_eq!(Insn::drw { y: 2, x: 1, n: 5 }, Insn::decode(&[0xd1, 0x25]).unwrap().1);
        assert_eq!(Insn::jp { A: 0x345 }, Insn::decode(&[0x13, 0x45]).unwrap().1);
        assert!(Insn::decode(&[0xf0, 0x00]).is_err());
    }

    #[test]
    fn display() {
        let show = |word: [u8; 2]| Insn::decode(&word).unwrap().1.to_string();
        assert_eq!("cls    ", show([0x00, 0xe0]));
        assert_eq!("drw    v1, v2, #5", show([0xd1, 0x25]));
        assert_eq!("ld     I, $300", show([0xa3, 0x00]));
        assert_eq!("ld     [I], v0..vF", show([0xff, 0x55]));
    }

    #[test]
    fn once() {
        let dis = Dis::default();
        assert!(dis.once(0x00e0).contains("cls"));
        assert!(dis.once(0xffff).contains("inval  ffff"));
    }

    #[test]
    fn invalid_shows_group() {
        let dis = Dis::default();
        assert!(dis.once(0x8a0f).contains("inval  8a0f (8xxx)"));
        assert!(dis.once(0x0123).contains("(0xxx)"));
    }

    #[test]
    fn at() {
        let line = Dis::default().at(0x2fe, 0x00e0);
        assert!(line.starts_with("2fe: "));
        assert!(line.contains("cls"));
        assert!(line.contains("00e0"));
    }

    #[test]
    fn byte() {
        let line = Dis::default().byte(0x203, 0x12);
        assert!(line.starts_with("203: "));
        assert!(line.contains("inval  12"));
    }
}
