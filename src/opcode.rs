use crate::error::Error;
use std::fmt;

/// The addressing fields of one 16-bit instruction word.
///
///  instruction  x    y    n
///  |----------||---||---||---|
///  1111        1111 1111 1111
///              |-------nnn--|
///                   |--nn---|
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub instruction: u8,
    pub nnn: u16,
    pub nn: u8,
    pub n: u8,
    pub x: u8,
    pub y: u8,
}

/// split an instruction word into its fields; total, never fails
pub fn decode(word: u16) -> Fields {
    Fields {
        instruction: ((word & 0xf000) >> 12) as u8,
        nnn: word & 0x0fff,
        nn: (word & 0x00ff) as u8,
        n: (word & 0x000f) as u8,
        x: ((word & 0x0f00) >> 8) as u8,
        y: ((word & 0x00f0) >> 4) as u8,
    }
}

/// One executable CHIP-8 operation, with its operands already pulled out of
/// the word. Registers are nibbles (0x0..=0xf).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// recognised group, but nothing to do (0NNN machine code, unknown 8XY?, 9XY? with N != 0)
    Noop,
    ClearDisplay,
    Return,
    Jump(u16),
    Call(u16),
    SkipIfEqual(u8, u8),
    SkipIfNotEqual(u8, u8),
    SkipIfRegEqual(u8, u8),
    SkipIfRegNotEqual(u8, u8),
    Store(u8, u8),
    AddImmediate(u8, u8),
    Copy(u8, u8),
    Or(u8, u8),
    And(u8, u8),
    Xor(u8, u8),
    AddWithCarry(u8, u8),
    SubXY(u8, u8),
    ShiftRight(u8),
    SubYX(u8, u8),
    ShiftLeft(u8),
    SetIndex(u16),
    JumpPlusV0(u16),
    Random(u8, u8),
    Draw(u8, u8, u8),
    SkipIfKey(u8),
    SkipIfNotKey(u8),
    GetDelay(u8),
    WaitKey(u8),
    SetDelay(u8),
    SetSound(u8),
    AddToIndex(u8),
    FontGlyph(u8),
    Bcd(u8),
    StoreRegisters(u8),
    LoadRegisters(u8),
}

impl Instruction {
    /// Map a raw word to the operation it names.
    ///
    /// Dispatch is on the top nibble first, then on `n` for the 0x8 group and
    /// `nn` for the 0x0, 0xE and 0xF groups. Unknown sub-opcodes in 0x0, 0x8
    /// and 0x9 become `Noop`; unknown sub-opcodes in 0xE and 0xF are errors.
    pub fn from_word(word: u16) -> Result<Instruction, Error> {
        let f = decode(word);
        let op = match f.instruction {
            0x0 => match f.nn {
                0xe0 => Instruction::ClearDisplay,
                0xee => Instruction::Return,
                _ => Instruction::Noop,
            },
            0x1 => Instruction::Jump(f.nnn),
            0x2 => Instruction::Call(f.nnn),
            0x3 => Instruction::SkipIfEqual(f.x, f.nn),
            0x4 => Instruction::SkipIfNotEqual(f.x, f.nn),
            // the low nibble is not checked for 5XY?
            0x5 => Instruction::SkipIfRegEqual(f.x, f.y),
            0x6 => Instruction::Store(f.x, f.nn),
            0x7 => Instruction::AddImmediate(f.x, f.nn),
            0x8 => match f.n {
                0x0 => Instruction::Copy(f.x, f.y),
                0x1 => Instruction::Or(f.x, f.y),
                0x2 => Instruction::And(f.x, f.y),
                0x3 => Instruction::Xor(f.x, f.y),
                0x4 => Instruction::AddWithCarry(f.x, f.y),
                0x5 => Instruction::SubXY(f.x, f.y),
                0x6 => Instruction::ShiftRight(f.x),
                0x7 => Instruction::SubYX(f.x, f.y),
                0xe => Instruction::ShiftLeft(f.x),
                _ => Instruction::Noop,
            },
            0x9 => match f.n {
                0x0 => Instruction::SkipIfRegNotEqual(f.x, f.y),
                _ => Instruction::Noop,
            },
            0xa => Instruction::SetIndex(f.nnn),
            0xb => Instruction::JumpPlusV0(f.nnn),
            0xc => Instruction::Random(f.x, f.nn),
            0xd => Instruction::Draw(f.x, f.y, f.n),
            0xe => match f.nn {
                0x9e => Instruction::SkipIfKey(f.x),
                0xa1 => Instruction::SkipIfNotKey(f.x),
                _ => return Err(Error::UnsupportedOpcode { opcode: word }),
            },
            0xf => match f.nn {
                0x07 => Instruction::GetDelay(f.x),
                0x0a => Instruction::WaitKey(f.x),
                0x15 => Instruction::SetDelay(f.x),
                0x18 => Instruction::SetSound(f.x),
                0x1e => Instruction::AddToIndex(f.x),
                0x29 => Instruction::FontGlyph(f.x),
                0x33 => Instruction::Bcd(f.x),
                0x55 => Instruction::StoreRegisters(f.x),
                0x65 => Instruction::LoadRegisters(f.x),
                _ => return Err(Error::UnsupportedOpcode { opcode: word }),
            },
            // instruction is a nibble, so every value is covered above
            _ => Instruction::Noop,
        };
        Ok(op)
    }
}

/// assembler-ish mnemonics, for trace logs
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Noop => write!(f, "NOP"),
            Instruction::ClearDisplay => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump(a) => write!(f, "JP {:#05x}", a),
            Instruction::Call(a) => write!(f, "CALL {:#05x}", a),
            Instruction::SkipIfEqual(x, nn) => write!(f, "SE V{:X}, {:#04x}", x, nn),
            Instruction::SkipIfNotEqual(x, nn) => write!(f, "SNE V{:X}, {:#04x}", x, nn),
            Instruction::SkipIfRegEqual(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::SkipIfRegNotEqual(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::Store(x, nn) => write!(f, "LD V{:X}, {:#04x}", x, nn),
            Instruction::AddImmediate(x, nn) => write!(f, "ADD V{:X}, {:#04x}", x, nn),
            Instruction::Copy(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Instruction::Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            Instruction::And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Instruction::Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            Instruction::AddWithCarry(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Instruction::SubXY(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            Instruction::ShiftRight(x) => write!(f, "SHR V{:X}", x),
            Instruction::SubYX(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Instruction::ShiftLeft(x) => write!(f, "SHL V{:X}", x),
            Instruction::SetIndex(a) => write!(f, "LD I, {:#05x}", a),
            Instruction::JumpPlusV0(a) => write!(f, "JP V0, {:#05x}", a),
            Instruction::Random(x, nn) => write!(f, "RND V{:X}, {:#04x}", x, nn),
            Instruction::Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::SkipIfKey(x) => write!(f, "SKP V{:X}", x),
            Instruction::SkipIfNotKey(x) => write!(f, "SKNP V{:X}", x),
            Instruction::GetDelay(x) => write!(f, "LD V{:X}, DT", x),
            Instruction::WaitKey(x) => write!(f, "LD V{:X}, K", x),
            Instruction::SetDelay(x) => write!(f, "LD DT, V{:X}", x),
            Instruction::SetSound(x) => write!(f, "LD ST, V{:X}", x),
            Instruction::AddToIndex(x) => write!(f, "ADD I, V{:X}", x),
            Instruction::FontGlyph(x) => write!(f, "LD F, V{:X}", x),
            Instruction::Bcd(x) => write!(f, "LD B, V{:X}", x),
            Instruction::StoreRegisters(x) => write!(f, "LD [I], V{:X}", x),
            Instruction::LoadRegisters(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
