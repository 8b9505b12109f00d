//! # cpu
//!
//! CHIP-8 machine state that isn't memory or the display:
//!  V0-VF   16 8bit general registers; VF doubles as carry/borrow/collision flag
//!  I       16bit index register
//!  PC      16bit program counter, starts at 0x200
//!  stack   16 return addresses plus a stack pointer
//!  DT, ST  delay and sound timers, counted down at 60Hz
//!
//! Memory is borrowed in for the fetch only; the cpu holds no reference to it.
use crate::error::Error;
use crate::memory::{MemoryMap, CHIP8_PROGRAM_ADDR};
use crate::timer::Timer;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;

/// size of one instruction
const WORD: u16 = 2;

/// the flag register
const VF: usize = 0xf;

pub struct Cpu {
    v: [u8; REGISTER_COUNT],
    index: u16,
    program_counter: u16,
    stack: [u16; STACK_DEPTH],
    stack_pointer: usize,
    delay_timer: Timer,
    sound_timer: Timer,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            v: [0; REGISTER_COUNT],
            index: 0,
            program_counter: CHIP8_PROGRAM_ADDR,
            stack: [0; STACK_DEPTH],
            stack_pointer: 0,
            delay_timer: Timer::new(),
            sound_timer: Timer::new(),
        }
    }

    /// read the word at PC and move PC on to the next one
    pub fn fetch(&mut self, memory: &impl MemoryMap) -> u16 {
        let word = memory.read_word(self.program_counter);
        self.program_counter = self.program_counter.wrapping_add(WORD);
        word
    }

    pub fn v(&self, reg: u8) -> u8 {
        self.v[reg as usize & 0xf]
    }

    pub fn set_v(&mut self, reg: u8, val: u8) {
        self.v[reg as usize & 0xf] = val;
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.v
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn set_index(&mut self, addr: u16) {
        self.index = addr;
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn stack_pointer(&self) -> usize {
        self.stack_pointer
    }

    // stack

    pub fn push(&mut self, addr: u16) -> Result<(), Error> {
        if self.stack_pointer >= STACK_DEPTH {
            return Err(Error::StackOverflow { addr });
        }
        self.stack[self.stack_pointer] = addr;
        self.stack_pointer += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Error> {
        if self.stack_pointer == 0 {
            return Err(Error::StackUnderflow);
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer])
    }

    // flow control

    pub fn jump(&mut self, addr: u16) {
        self.program_counter = addr;
    }

    /// (2nnn) PC already points past the call, so that's the return address
    pub fn call_subroutine(&mut self, addr: u16) -> Result<(), Error> {
        self.push(self.program_counter).map_err(|_| Error::StackOverflow { addr })?;
        self.jump(addr);
        Ok(())
    }

    /// (00ee)
    pub fn return_from_subroutine(&mut self) -> Result<(), Error> {
        let addr = self.pop()?;
        self.jump(addr);
        Ok(())
    }

    /// (bnnn)
    pub fn jump_to_address_plus_v0(&mut self, addr: u16) {
        self.program_counter = addr.wrapping_add(self.v[0] as u16);
    }

    /// step over the next instruction
    pub fn skip(&mut self) {
        self.program_counter = self.program_counter.wrapping_add(WORD);
    }

    fn skip_when(&mut self, condition: bool) {
        if condition {
            self.skip();
        }
    }

    /// (3xnn)
    pub fn skip_if_equal(&mut self, reg: u8, val: u8) {
        self.skip_when(self.v(reg) == val);
    }

    /// (4xnn)
    pub fn skip_if_not_equal(&mut self, reg: u8, val: u8) {
        self.skip_when(self.v(reg) != val);
    }

    /// (5xy0)
    pub fn skip_if_reg_equal(&mut self, x: u8, y: u8) {
        self.skip_when(self.v(x) == self.v(y));
    }

    /// (9xy0)
    pub fn skip_if_reg_not_equal(&mut self, x: u8, y: u8) {
        self.skip_when(self.v(x) != self.v(y));
    }

    // arithmetic and logic. where a flag is produced, VF is written first and
    // VX second, so with X = F the result wins over the flag.

    /// (6xnn)
    pub fn store_immediate(&mut self, x: u8, val: u8) {
        self.set_v(x, val);
    }

    /// (7xnn) no carry flag
    pub fn add_immediate(&mut self, x: u8, val: u8) {
        self.set_v(x, self.v(x).wrapping_add(val));
    }

    /// (8xy0)
    pub fn copy_register(&mut self, x: u8, y: u8) {
        self.set_v(x, self.v(y));
    }

    /// (8xy1)
    pub fn or(&mut self, x: u8, y: u8) {
        self.set_v(x, self.v(x) | self.v(y));
    }

    /// (8xy2)
    pub fn and(&mut self, x: u8, y: u8) {
        self.set_v(x, self.v(x) & self.v(y));
    }

    /// (8xy3)
    pub fn xor(&mut self, x: u8, y: u8) {
        self.set_v(x, self.v(x) ^ self.v(y));
    }

    /// (8xy4) VF = 1 on carry
    pub fn add_with_carry(&mut self, x: u8, y: u8) {
        let (val, carry) = self.v(x).overflowing_add(self.v(y));
        self.v[VF] = carry as u8;
        self.set_v(x, val);
    }

    /// (8xy5) VX = VX - VY, VF = 1 when there is no borrow
    pub fn sub_x_y(&mut self, x: u8, y: u8) {
        let (val, borrow) = self.v(x).overflowing_sub(self.v(y));
        self.v[VF] = !borrow as u8;
        self.set_v(x, val);
    }

    /// (8xy7) VX = VY - VX, VF = 1 when there is no borrow
    pub fn sub_y_x(&mut self, x: u8, y: u8) {
        let (val, borrow) = self.v(y).overflowing_sub(self.v(x));
        self.v[VF] = !borrow as u8;
        self.set_v(x, val);
    }

    /// (8xy6) VF = bit shifted out
    pub fn shift_right(&mut self, x: u8) {
        self.v[VF] = self.v(x) & 0x01;
        self.set_v(x, self.v(x) >> 1);
    }

    /// (8xye) VF = bit shifted out
    pub fn shift_left(&mut self, x: u8) {
        self.v[VF] = (self.v(x) & 0x80) >> 7;
        self.set_v(x, self.v(x) << 1);
    }

    // timers

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.value()
    }

    pub fn set_delay_timer(&mut self, val: u8) {
        self.delay_timer.set_value(val);
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.value()
    }

    pub fn set_sound_timer(&mut self, val: u8) {
        self.sound_timer.set_value(val);
    }

    pub fn reset_sound_timer(&mut self) {
        self.sound_timer.reset();
    }

    /// tick both timers; true if the sound timer ran out on this tick
    pub fn tick_60hz(&mut self) -> bool {
        self.delay_timer.tick();
        self.sound_timer.tick()
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
