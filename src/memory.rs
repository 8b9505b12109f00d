use crate::error::Error;
use log::info;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the addressable memory image
pub trait MemoryMap {
    /// read one byte
    fn read_byte(&self, addr: u16) -> u8;

    /// write one byte
    fn write_byte(&mut self, addr: u16, val: u8);

    /// get a big-endian two-byte word (instruction fetch)
    fn read_word(&self, addr: u16) -> u16 {
        ((self.read_byte(addr) as u16) << 8) | (self.read_byte(addr.wrapping_add(1)) as u16)
    }

    /// write a chunk of bytes, one after another from `addr`
    fn write(&mut self, data: &[u8], addr: u16) {
        for (offset, byte) in data.iter().enumerate() {
            self.write_byte(addr.wrapping_add(offset as u16), *byte);
        }
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// biggest ROM that fits between the program address and the top of RAM
pub const CHIP8_MAX_ROM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// where the hex digit glyphs live
pub const CHIP8_FONT_ADDR: u16 = 0x000;

/// bytes per glyph
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 standard memory map
///   0x0000-0x004f  font glyphs 0-F
///   0x0050-0x01ff  unused (interpreter on real hardware)
///   0x0200-0x0fff  program
///
/// Addresses are masked to 12 bits, so anything past 0x0fff wraps back to
/// the bottom of RAM rather than faulting.
pub struct Chip8Memory {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8Memory {
    fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[Self::index(addr)]
    }

    fn write_byte(&mut self, addr: u16, val: u8) {
        self.bytes[Self::index(addr)] = val;
    }
}

impl Chip8Memory {
    /// initialises RAM with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8Memory {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.write(&CHIP8_FONT, CHIP8_FONT_ADDR);
        mm
    }

    fn index(addr: u16) -> usize {
        addr as usize % CHIP8_RAM_SIZE_BYTES
    }

    /// load a CHIP-8 program at 0x200. the size is checked before anything
    /// is copied, so a rejected ROM leaves memory untouched
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Error> {
        if rom.len() > CHIP8_MAX_ROM_BYTES {
            return Err(Error::RomTooLarge {
                size: rom.len(),
                max_size: CHIP8_MAX_ROM_BYTES,
            });
        }
        self.write(rom, CHIP8_PROGRAM_ADDR);
        info!("loaded {} byte ROM at {:#05x}", rom.len(), CHIP8_PROGRAM_ADDR);
        Ok(())
    }

    /// read unknown len of data and load it as a program
    pub fn load_rom_from(&mut self, reader: &mut impl io::Read) -> Result<(), Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_rom(&buf)
    }

    /// the whole image, for inspection
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Chip8Memory {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8Memory::new();
        // NB. memory is zeroed from 0x50 because before that we bake in the font
        assert_eq!(m.bytes.len(), CHIP8_RAM_SIZE_BYTES);
        assert!(m.bytes[0x50..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_font_layout() {
        let m = Chip8Memory::new();
        assert_eq!(m.bytes[..80], CHIP8_FONT);
        // glyph for 'A' starts at 10 * 5
        assert_eq!(m.read_byte(50), 0xF0);
        assert_eq!(m.read_byte(51), 0x90);
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8Memory::new();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x308);
        assert_eq!(
            dst.bytes[0x300..0x310],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8Memory::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300);
        assert_eq!(m.read_word(0x304), 0x0405);
    }

    #[test]
    fn test_addresses_wrap() {
        let mut m = Chip8Memory::new();
        m.write_byte(0x1000, 0xab);
        assert_eq!(m.read_byte(0x000), 0xab);
        m.write_byte(0x0fff, 0x12);
        assert_eq!(m.read_word(0x0fff), 0x12ab);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Error> {
        let mut dst = Chip8Memory::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        dst.load_rom_from(&mut prog)?;
        assert_eq!(dst.bytes[0x200..0x203], [0x00, 0xe0, 0x00]);
        Ok(())
    }

    #[test]
    fn test_largest_rom_fits() -> Result<(), Error> {
        let mut dst = Chip8Memory::new();
        dst.load_rom(&[0xaa; 3584])?;
        assert_eq!(dst.read_byte(0x200), 0xaa);
        assert_eq!(dst.read_byte(0xfff), 0xaa);
        assert_eq!(dst.bytes[..80], CHIP8_FONT);
        Ok(())
    }

    #[test]
    fn test_oversized_rom_rejected_untouched() {
        let mut dst = Chip8Memory::new();
        let before = dst.as_slice().to_vec();
        match dst.load_rom(&[0xaa; 3585]) {
            Err(Error::RomTooLarge { size, max_size }) => {
                assert_eq!(size, 3585);
                assert_eq!(max_size, 3584);
            }
            other => panic!("expected RomTooLarge, got {:?}", other),
        }
        assert_eq!(dst.as_slice(), &before[..]);
    }

    #[test]
    fn test_reload_keeps_tail() -> Result<(), Error> {
        let mut dst = Chip8Memory::new();
        dst.load_rom(&[1, 2, 3, 4])?;
        dst.load_rom(&[9, 9])?;
        assert_eq!(dst.bytes[0x200..0x204], [9, 9, 3, 4]);
        Ok(())
    }
}
