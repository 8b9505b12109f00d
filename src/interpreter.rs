//! # interpreter
//!
//! Owns the cpu, memory and framebuffer, and borrows the host's keyboard,
//! sound and randomness. Two entry points, both driven from outside:
//!  step()        fetch, decode and execute one instruction (~500Hz)
//!  tick_frame()  count the timers down and beep when the sound timer ends (60Hz)
use crate::cpu::Cpu;
use crate::display::Display;
use crate::error::Error;
use crate::input::Keyboard;
use crate::memory::{
    Chip8Memory, MemoryMap, CHIP8_FONT_ADDR, CHIP8_FONT_GLYPH_BYTES, CHIP8_PROGRAM_ADDR,
};
use crate::opcode::Instruction;
use crate::sound::Sound;
use log::{debug, trace};
use rand::{Rng, RngCore};
use std::io;

/// the most rows a DXYN sprite can have
const MAX_SPRITE_ROWS: usize = 15;

/// What happened on a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// instruction executed, keep going
    Continue,
    /// the host asked to stop while we were waiting for a key
    Quit,
}

pub struct Chip8Interpreter<'a> {
    cpu: Cpu,
    memory: Chip8Memory,
    display: Display,
    keyboard: &'a mut dyn Keyboard,
    sound: &'a mut dyn Sound,
    rng: &'a mut dyn RngCore,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        keyboard: &'a mut dyn Keyboard,
        sound: &'a mut dyn Sound,
        rng: &'a mut dyn RngCore,
    ) -> Chip8Interpreter<'a> {
        Chip8Interpreter {
            cpu: Cpu::new(),
            memory: Chip8Memory::new(),
            display: Display::new(),
            keyboard,
            sound,
            rng,
        }
    }

    /// load a chip8 program at 0x200 and point PC at it
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Error> {
        self.memory.load_rom(rom)?;
        self.cpu.jump(CHIP8_PROGRAM_ADDR);
        Ok(())
    }

    /// load a chip8 program from a reader (e.g. a ROM file)
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), Error> {
        self.memory.load_rom_from(reader)?;
        self.cpu.jump(CHIP8_PROGRAM_ADDR);
        Ok(())
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn memory(&self) -> &Chip8Memory {
        &self.memory
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut Display {
        &mut self.display
    }

    /// has the keyboard's owner asked to stop
    pub fn quit_requested(&mut self) -> bool {
        self.keyboard.quit_requested()
    }

    /// fetch, decode and execute one instruction
    pub fn step(&mut self) -> Result<StepResult, Error> {
        let addr = self.cpu.program_counter();
        let word = self.cpu.fetch(&self.memory);
        let instruction = Instruction::from_word(word)?;
        trace!("{:#05x}  {:04x}  {}", addr, word, instruction);
        self.execute(instruction)
    }

    /// one 60Hz frame: tick both timers, beep once if the sound timer just
    /// ran out
    pub fn tick_frame(&mut self) {
        if self.cpu.tick_60hz() {
            debug!("sound timer expired");
            self.cpu.reset_sound_timer();
            self.sound.play();
        }
    }

    /// carry out a decoded instruction
    pub fn execute(&mut self, instruction: Instruction) -> Result<StepResult, Error> {
        match instruction {
            Instruction::Noop => {}
            Instruction::ClearDisplay => self.display.clear(),
            Instruction::Return => self.cpu.return_from_subroutine()?,
            Instruction::Jump(addr) => self.cpu.jump(addr),
            Instruction::Call(addr) => self.cpu.call_subroutine(addr)?,
            Instruction::SkipIfEqual(x, nn) => self.cpu.skip_if_equal(x, nn),
            Instruction::SkipIfNotEqual(x, nn) => self.cpu.skip_if_not_equal(x, nn),
            Instruction::SkipIfRegEqual(x, y) => self.cpu.skip_if_reg_equal(x, y),
            Instruction::SkipIfRegNotEqual(x, y) => self.cpu.skip_if_reg_not_equal(x, y),
            Instruction::Store(x, nn) => self.cpu.store_immediate(x, nn),
            Instruction::AddImmediate(x, nn) => self.cpu.add_immediate(x, nn),
            Instruction::Copy(x, y) => self.cpu.copy_register(x, y),
            Instruction::Or(x, y) => self.cpu.or(x, y),
            Instruction::And(x, y) => self.cpu.and(x, y),
            Instruction::Xor(x, y) => self.cpu.xor(x, y),
            Instruction::AddWithCarry(x, y) => self.cpu.add_with_carry(x, y),
            Instruction::SubXY(x, y) => self.cpu.sub_x_y(x, y),
            Instruction::ShiftRight(x) => self.cpu.shift_right(x),
            Instruction::SubYX(x, y) => self.cpu.sub_y_x(x, y),
            Instruction::ShiftLeft(x) => self.cpu.shift_left(x),
            Instruction::SetIndex(addr) => self.cpu.set_index(addr),
            Instruction::JumpPlusV0(addr) => self.cpu.jump_to_address_plus_v0(addr),
            Instruction::Random(x, nn) => {
                let byte: u8 = self.rng.gen();
                self.cpu.set_v(x, byte & nn);
            }
            Instruction::Draw(x, y, n) => self.draw(x, y, n),
            Instruction::SkipIfKey(x) => {
                if self.keyboard.is_key_pressed(self.cpu.v(x)) {
                    self.cpu.skip();
                }
            }
            Instruction::SkipIfNotKey(x) => {
                if !self.keyboard.is_key_pressed(self.cpu.v(x)) {
                    self.cpu.skip();
                }
            }
            Instruction::GetDelay(x) => self.cpu.set_v(x, self.cpu.delay_timer()),
            Instruction::WaitKey(x) => match self.keyboard.wait_for_key() {
                Some(key) => self.cpu.set_v(x, key),
                None => {
                    debug!("quit while waiting for a key");
                    return Ok(StepResult::Quit);
                }
            },
            Instruction::SetDelay(x) => self.cpu.set_delay_timer(self.cpu.v(x)),
            Instruction::SetSound(x) => self.cpu.set_sound_timer(self.cpu.v(x)),
            Instruction::AddToIndex(x) => {
                let i = self.cpu.index().wrapping_add(self.cpu.v(x) as u16);
                self.cpu.set_index(i);
            }
            Instruction::FontGlyph(x) => {
                let glyph = self.cpu.v(x) as u16 * CHIP8_FONT_GLYPH_BYTES + CHIP8_FONT_ADDR;
                self.cpu.set_index(glyph);
            }
            Instruction::Bcd(x) => {
                let val = self.cpu.v(x);
                let i = self.cpu.index();
                self.memory.write(&[val / 100, val / 10 % 10, val % 10], i);
            }
            Instruction::StoreRegisters(x) => {
                let i = self.cpu.index();
                let count = x as usize + 1;
                self.memory.write(&self.cpu.registers()[..count], i);
                self.cpu.set_index(i.wrapping_add(count as u16));
            }
            Instruction::LoadRegisters(x) => {
                let i = self.cpu.index();
                for reg in 0..=x {
                    let val = self.memory.read_byte(i.wrapping_add(reg as u16));
                    self.cpu.set_v(reg, val);
                }
                self.cpu.set_index(i.wrapping_add(x as u16 + 1));
            }
        }
        Ok(StepResult::Continue)
    }

    /// (dxyn) sprite is n bytes from I, drawn at (VX, VY); VF = collision
    fn draw(&mut self, x: u8, y: u8, n: u8) {
        let mut sprite = [0u8; MAX_SPRITE_ROWS];
        let rows = &mut sprite[..n as usize];
        let i = self.cpu.index();
        for (r, row) in rows.iter_mut().enumerate() {
            *row = self.memory.read_byte(i.wrapping_add(r as u16));
        }
        let collision =
            self.display
                .draw_sprite(self.cpu.v(x) as usize, self.cpu.v(y) as usize, rows);
        self.cpu.set_v(0xf, collision as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::DummyInput;
    use crate::sound::CountingSound;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// build an interpreter over the given devices and load `prog`
    fn with_program<'a>(
        input: &'a mut DummyInput,
        sound: &'a mut CountingSound,
        rng: &'a mut StdRng,
        prog: &[u8],
    ) -> Result<Chip8Interpreter<'a>, Error> {
        let mut i = Chip8Interpreter::new(input, sound, rng);
        i.load_rom(prog)?;
        Ok(i)
    }

    fn run(i: &mut Chip8Interpreter, steps: usize) -> Result<(), Error> {
        for _ in 0..steps {
            assert_eq!(i.step()?, StepResult::Continue);
        }
        Ok(())
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Error> {
        let mut input = DummyInput::new(&[]);
        let mut sound = CountingSound::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut i = Chip8Interpreter::new(&mut input, &mut sound, &mut rng);
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        i.load_program(&mut prog)?;
        assert_eq!(i.memory().read_word(0x200), 0x00e0);
        assert_eq!(i.cpu().program_counter(), 0x200);
        Ok(())
    }

    #[test]
    fn test_oversized_rom() {
        let mut input = DummyInput::new(&[]);
        let mut sound = CountingSound::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut i = Chip8Interpreter::new(&mut input, &mut sound, &mut rng);
        assert!(matches!(
            i.load_rom(&[0; 3585]),
            Err(Error::RomTooLarge { size: 3585, .. })
        ));
    }

    #[test]
    fn test_load_store_add() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(
            &mut input,
            &mut sound,
            &mut rng,
            &[
                0x60, 0xc8, // LD V0, 200
                0x61, 0x64, // LD V1, 100
                0x80, 0x14, // ADD V0, V1
                0x72, 0xff, // ADD V2, 0xff
                0x72, 0x02, // ADD V2, 2 (wraps, no flag)
            ],
        )?;
        run(&mut i, 3)?;
        assert_eq!(i.cpu().v(0), 44);
        assert_eq!(i.cpu().v(0xf), 1);
        run(&mut i, 2)?;
        assert_eq!(i.cpu().v(2), 1);
        assert_eq!(i.cpu().v(0xf), 1);
        Ok(())
    }

    fn devices() -> (DummyInput, CountingSound, StdRng) {
        (
            DummyInput::new(&[]),
            CountingSound::default(),
            StdRng::seed_from_u64(8),
        )
    }

    #[test]
    fn test_jump_and_call() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut prog = vec![0u8; 0x20];
        prog[0..2].copy_from_slice(&[0x22, 0x10]); // 0x200 CALL 0x210
        prog[2..4].copy_from_slice(&[0x12, 0x08]); // 0x202 JP 0x208
        prog[0x10..0x12].copy_from_slice(&[0x00, 0xee]); // 0x210 RET
        let mut i = with_program(&mut input, &mut sound, &mut rng, &prog)?;
        i.step()?;
        assert_eq!(i.cpu().program_counter(), 0x210);
        assert_eq!(i.cpu().stack_pointer(), 1);
        i.step()?;
        assert_eq!(i.cpu().program_counter(), 0x202);
        assert_eq!(i.cpu().stack_pointer(), 0);
        i.step()?;
        assert_eq!(i.cpu().program_counter(), 0x208);
        Ok(())
    }

    #[test]
    fn test_return_on_empty_stack() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(&mut input, &mut sound, &mut rng, &[0x00, 0xee])?;
        assert!(matches!(i.step(), Err(Error::StackUnderflow)));
        Ok(())
    }

    #[test]
    fn test_recursion_overflows() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(&mut input, &mut sound, &mut rng, &[0x22, 0x00])?;
        run(&mut i, 16)?;
        assert!(matches!(i.step(), Err(Error::StackOverflow { addr: 0x200 })));
        Ok(())
    }

    #[test]
    fn test_skips() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(
            &mut input,
            &mut sound,
            &mut rng,
            &[
                0x60, 0x05, // 200 LD V0, 5
                0x30, 0x05, // 202 SE V0, 5    -> skip
                0x00, 0x00, // 204
                0x40, 0x05, // 206 SNE V0, 5   -> no skip
                0x61, 0x05, // 208 LD V1, 5
                0x50, 0x10, // 20a SE V0, V1   -> skip
                0x00, 0x00, // 20c
                0x90, 0x10, // 20e SNE V0, V1  -> no skip
            ],
        )?;
        run(&mut i, 2)?;
        assert_eq!(i.cpu().program_counter(), 0x206);
        run(&mut i, 3)?;
        assert_eq!(i.cpu().program_counter(), 0x20e);
        run(&mut i, 1)?;
        assert_eq!(i.cpu().program_counter(), 0x210);
        Ok(())
    }

    #[test]
    fn test_skip_if_registers_differ() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(
            &mut input,
            &mut sound,
            &mut rng,
            &[
                0x60, 0x05, // 200 LD V0, 5
                0x61, 0x06, // 202 LD V1, 6
                0x90, 0x10, // 204 SNE V0, V1  -> skip
                0x00, 0x00, // 206
                0x50, 0x10, // 208 SE V0, V1   -> no skip
            ],
        )?;
        run(&mut i, 3)?;
        assert_eq!(i.cpu().program_counter(), 0x208);
        run(&mut i, 1)?;
        assert_eq!(i.cpu().program_counter(), 0x20a);
        Ok(())
    }

    #[test]
    fn test_unknown_8_group_is_noop() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(&mut input, &mut sound, &mut rng, &[0x60, 0x07, 0x80, 0x08])?;
        run(&mut i, 2)?;
        assert_eq!(i.cpu().v(0), 7);
        assert_eq!(i.cpu().program_counter(), 0x204);
        Ok(())
    }

    #[test]
    fn test_unknown_f_group_is_fatal() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(&mut input, &mut sound, &mut rng, &[0xf0, 0xff])?;
        assert!(matches!(
            i.step(),
            Err(Error::UnsupportedOpcode { opcode: 0xf0ff })
        ));
        Ok(())
    }

    #[test]
    fn test_random_is_masked() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(&mut input, &mut sound, &mut rng, &[0xc3, 0x0f, 0xc4, 0x00])?;
        run(&mut i, 2)?;
        assert_eq!(i.cpu().v(3) & 0xf0, 0);
        assert_eq!(i.cpu().v(4), 0);
        Ok(())
    }

    #[test]
    fn test_random_is_reproducible() -> Result<(), Error> {
        let prog = [0xc0, 0xff, 0xc1, 0xff, 0xc2, 0xff];
        let mut seen = Vec::new();
        for _ in 0..2 {
            let (mut input, mut sound, mut rng) = devices();
            let mut i = with_program(&mut input, &mut sound, &mut rng, &prog)?;
            run(&mut i, 3)?;
            seen.push([i.cpu().v(0), i.cpu().v(1), i.cpu().v(2)]);
        }
        assert_eq!(seen[0], seen[1]);
        Ok(())
    }

    #[test]
    fn test_draw_font_and_collide() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(
            &mut input,
            &mut sound,
            &mut rng,
            &[
                0x60, 0x00, // LD V0, 0
                0xf0, 0x29, // LD F, V0
                0xd0, 0x05, // DRW V0, V0, 5
                0xd0, 0x05, // DRW V0, V0, 5
            ],
        )?;
        run(&mut i, 3)?;
        assert_eq!(i.cpu().index(), 0);
        assert_eq!(i.cpu().v(0xf), 0);
        // top row of '0' is 0xF0
        assert!((0..4).all(|x| i.display().is_on(x, 0)));
        assert!(!i.display().is_on(4, 0));
        run(&mut i, 1)?;
        assert_eq!(i.cpu().v(0xf), 1);
        assert!(i.display().pixels().iter().all(|p| *p == 0));
        Ok(())
    }

    #[test]
    fn test_draw_clips_at_right_edge() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(
            &mut input,
            &mut sound,
            &mut rng,
            &[
                0x60, 0x3c, // LD V0, 60
                0x61, 0x00, // LD V1, 0
                0xa2, 0x08, // LD I, 0x208
                0xd0, 0x11, // DRW V0, V1, 1
                0xff, 0x00, // sprite row
            ],
        )?;
        run(&mut i, 4)?;
        let lit: Vec<usize> = (0..64).filter(|x| i.display().is_on(*x, 0)).collect();
        assert_eq!(lit, vec![60, 61, 62, 63]);
        Ok(())
    }

    #[test]
    fn test_font_glyph_address() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(&mut input, &mut sound, &mut rng, &[0x65, 0x0b, 0xf5, 0x29])?;
        run(&mut i, 2)?;
        assert_eq!(i.cpu().index(), 55);
        Ok(())
    }

    #[test]
    fn test_bcd() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(
            &mut input,
            &mut sound,
            &mut rng,
            &[0x6a, 0xfe, 0xa3, 0x00, 0xfa, 0x33], // V A = 254, I = 0x300, BCD
        )?;
        run(&mut i, 3)?;
        assert_eq!(i.memory().read_byte(0x300), 2);
        assert_eq!(i.memory().read_byte(0x301), 5);
        assert_eq!(i.memory().read_byte(0x302), 4);
        assert_eq!(i.cpu().index(), 0x300);
        Ok(())
    }

    #[test]
    fn test_store_and_load_registers() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(
            &mut input,
            &mut sound,
            &mut rng,
            &[
                0x60, 0x11, // LD V0, 0x11
                0x61, 0x22, // LD V1, 0x22
                0x62, 0x33, // LD V2, 0x33
                0xa3, 0x00, // LD I, 0x300
                0xf2, 0x55, // LD [I], V2
                0xa3, 0x01, // LD I, 0x301
                0xf1, 0x65, // LD V1, [I]
            ],
        )?;
        run(&mut i, 5)?;
        assert_eq!(i.memory().as_slice()[0x300..0x304], [0x11, 0x22, 0x33, 0x00]);
        assert_eq!(i.cpu().index(), 0x303);
        run(&mut i, 2)?;
        assert_eq!(i.cpu().v(0), 0x22);
        assert_eq!(i.cpu().v(1), 0x33);
        assert_eq!(i.cpu().v(2), 0x33);
        assert_eq!(i.cpu().index(), 0x303);
        Ok(())
    }

    #[test]
    fn test_add_to_index() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(
            &mut input,
            &mut sound,
            &mut rng,
            &[0xaf, 0xff, 0x63, 0x02, 0xf3, 0x1e], // I = 0xfff, V3 = 2, I += V3
        )?;
        run(&mut i, 3)?;
        assert_eq!(i.cpu().index(), 0x1001);
        Ok(())
    }

    #[test]
    fn test_jump_plus_v0() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(&mut input, &mut sound, &mut rng, &[0x60, 0x04, 0xb3, 0x00])?;
        run(&mut i, 2)?;
        assert_eq!(i.cpu().program_counter(), 0x304);
        Ok(())
    }

    #[test]
    fn test_key_skips() -> Result<(), Error> {
        let mut input = DummyInput::new(&[0x7]);
        let mut sound = CountingSound::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut i = with_program(
            &mut input,
            &mut sound,
            &mut rng,
            &[
                0x60, 0x07, // 200 LD V0, 7
                0xe0, 0x9e, // 202 SKP V0     -> skip
                0x00, 0x00, // 204
                0xe0, 0xa1, // 206 SKNP V0    -> no skip
                0x61, 0x08, // 208 LD V1, 8
                0xe1, 0xa1, // 20a SKNP V1    -> skip
            ],
        )?;
        run(&mut i, 2)?;
        assert_eq!(i.cpu().program_counter(), 0x206);
        run(&mut i, 1)?;
        assert_eq!(i.cpu().program_counter(), 0x208);
        run(&mut i, 2)?;
        assert_eq!(i.cpu().program_counter(), 0x20e);
        Ok(())
    }

    #[test]
    fn test_wait_for_key() -> Result<(), Error> {
        let mut input = DummyInput::new(&[]).with_queued(&[0xc]);
        let mut sound = CountingSound::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut i = with_program(&mut input, &mut sound, &mut rng, &[0xf4, 0x0a, 0xf4, 0x0a])?;
        assert_eq!(i.step()?, StepResult::Continue);
        assert_eq!(i.cpu().v(4), 0xc);
        // queue is empty, so the host "quits"
        assert_eq!(i.step()?, StepResult::Quit);
        Ok(())
    }

    #[test]
    fn test_delay_timer() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(
            &mut input,
            &mut sound,
            &mut rng,
            &[0x63, 0x0a, 0xf3, 0x15, 0xf5, 0x07], // V3 = 10, DT = V3, V5 = DT
        )?;
        run(&mut i, 2)?;
        i.tick_frame();
        i.tick_frame();
        run(&mut i, 1)?;
        assert_eq!(i.cpu().v(5), 8);
        Ok(())
    }

    #[test]
    fn test_sound_plays_once_per_expiry() -> Result<(), Error> {
        let mut input = DummyInput::new(&[]);
        let mut sound = CountingSound::default();
        let mut rng = StdRng::seed_from_u64(0);
        {
            let mut i = with_program(
                &mut input,
                &mut sound,
                &mut rng,
                &[
                    0x63, 0x02, // V3 = 2
                    0xf3, 0x18, // ST = V3
                    0xf3, 0x18, // ST = V3
                ],
            )?;
            run(&mut i, 2)?;
            i.tick_frame();
            i.tick_frame();
            i.tick_frame();
            i.tick_frame();
            assert_eq!(i.cpu().sound_timer(), 0);
            // a new countdown can trigger again
            run(&mut i, 1)?;
            for _ in 0..5 {
                i.tick_frame();
            }
        }
        assert_eq!(sound.plays, 2);
        Ok(())
    }

    #[test]
    fn test_clear_screen() -> Result<(), Error> {
        let (mut input, mut sound, mut rng) = devices();
        let mut i = with_program(&mut input, &mut sound, &mut rng, &[0xd0, 0x05, 0x00, 0xe0])?;
        run(&mut i, 1)?;
        assert!(i.display().is_on(0, 0));
        i.display_mut().clear_refresh();
        run(&mut i, 1)?;
        assert!(i.display().pixels().iter().all(|p| *p == 0));
        assert!(i.display().refresh_requested());
        Ok(())
    }
}
