use crate::error::Error;

/// The resolutions a CHIP-8 program might ask for. Only standard is
/// implemented; enhanced is known about so it can be refused cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// 64x32
    Standard,
    /// 128x64
    Enhanced,
}

impl DisplayMode {
    pub fn resolution(&self) -> (usize, usize) {
        match self {
            DisplayMode::Standard => (64, 32),
            DisplayMode::Enhanced => (128, 64),
        }
    }
}

/// pixel value for a lit pixel; XORing with it toggles
pub const PIXEL_ON: u8 = 0xff;

/// The framebuffer. Pixels are bytes (0 = off, anything else = on) stored
/// row-major. Whoever renders it should check `refresh_requested`, draw, then
/// call `clear_refresh`.
pub struct Display {
    mode: DisplayMode,
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    refresh_requested: bool,
}

impl Display {
    pub fn new() -> Self {
        let mode = DisplayMode::Standard;
        let (width, height) = mode.resolution();
        Display {
            mode,
            width,
            height,
            pixels: vec![0; width * height],
            refresh_requested: true,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// only standard mode exists; asking for it again is a no-op
    pub fn set_mode(&mut self, mode: DisplayMode) -> Result<(), Error> {
        match mode {
            DisplayMode::Standard => Ok(()),
            DisplayMode::Enhanced => Err(Error::NotSupported(mode)),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// row-major, `width * height` long
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn is_on(&self, x: usize, y: usize) -> bool {
        self.pixel(x, y).map_or(false, |p| p != 0)
    }

    pub fn refresh_requested(&self) -> bool {
        self.refresh_requested
    }

    /// renderer calls this once it has drawn the frame
    pub fn clear_refresh(&mut self) {
        self.refresh_requested = false;
    }

    /// (00e0)
    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|p| *p = 0);
        self.refresh_requested = true;
    }

    /// XOR a sprite onto the framebuffer, one byte per row, MSB leftmost.
    /// Pixels falling off the right or bottom edge are dropped, there is no
    /// wraparound. Returns true if any lit pixel was turned off.
    pub fn draw_sprite(&mut self, pos_x: usize, pos_y: usize, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (r, row_bits) in sprite.iter().enumerate() {
            let y = pos_y + r;
            if y >= self.height {
                continue;
            }
            for bit in 0..8 {
                let x = pos_x + bit;
                if x >= self.width {
                    continue;
                }
                if row_bits & (0x80 >> bit) == 0 {
                    continue;
                }
                let pixel = &mut self.pixels[y * self.width + x];
                let before = *pixel;
                *pixel ^= PIXEL_ON;
                if before != 0 && *pixel == 0 {
                    collision = true;
                }
            }
        }
        self.refresh_requested = true;
        collision
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}
