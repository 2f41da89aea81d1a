//! Tests for chip8vm

use super::*;

mod hex {
    use super::*;
    #[test]
    fn parse() {
        assert_eq!(Ok(0x2fe), parse_hex("2fe"));
        assert_eq!(Ok(0xabc), parse_hex("ABC"));
    }
    #[test]
    fn reject() {
        assert!(parse_hex("0x200").is_err());
        assert!(parse_hex("").is_err());
    }
}

mod keys {
    use super::*;
    #[test]
    fn none() -> Result<()> {
        assert_eq!(Keypad::new(), parse_keys("")?);
        Ok(())
    }
    #[test]
    fn qwerty() -> Result<()> {
        let keys = parse_keys("4Xv")?;
        for key in 0..16 {
            assert_eq!(matches!(key, 0x0 | 0xc | 0xf), keys.is_pressed(key)?);
        }
        Ok(())
    }
    #[test]
    fn unmapped() {
        assert!(matches!(
            parse_keys("qp"),
            Err(Error::InvalidKey { key }) if key == 'p' as usize
        ));
    }
}

mod state {
    use super::*;
    fn state(program: &[u8], cycles: usize) -> State {
        let mut cpu = CPU::default();
        cpu.load_program_bytes(program).unwrap();
        State {
            step: 4,
            cycles,
            rate: 0,
            cpu,
            keys: Keypad::new(),
            ft: Instant::now(),
        }
    }
    #[test]
    fn runs_to_cycle_limit() {
        let mut state = state(b"\x12\x00", 10);
        assert_eq!(3, (&mut state).filter(Result::is_ok).count());
        assert_eq!(10, state.cpu.cycle());
    }
    #[test]
    fn paused_single_steps() {
        let mut state = state(b"\x12\x00", 3);
        state.cpu.flags.pause = true;
        assert_eq!(3, (&mut state).count());
        assert_eq!(3, state.cpu.cycle());
    }
    #[test]
    fn breakpoint_pauses() {
        let mut state = state(b"\x00\xe0\x12\x00", 8);
        state.cpu.set_break(0x202);
        assert!(state.next().unwrap().is_ok());
        assert!(state.cpu.flags.pause);
        assert_eq!(1, state.cpu.cycle());
    }
    #[test]
    fn fault_ends_run() {
        let mut state = state(b"\x00\xee", 8);
        assert!(state.next().unwrap().is_err());
        assert_eq!(0x200, state.cpu.pc());
    }
}
