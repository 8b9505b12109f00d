use crate::input::{CHIP8_CONVENTIONAL_KEYMAP, CHIP8_LITERAL_KEYMAP};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 500;
pub const FRAMES_PER_SECOND: u32 = 60;
pub const DEFAULT_KEY_HOLD_MS: u64 = 100;

/// Which device makes the beep
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SoundDevice {
    /// PC speaker tone
    Beep,
    /// terminal bell character
    Bell,
    /// nothing
    Mute,
}

/// How terminal keys map onto the hex keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Keymap {
    /// 1234 / qwer / asdf / zxcv, laid out like the COSMAC VIP keypad
    Conventional,
    /// 0-9 and a-f type themselves
    Literal,
}

impl Keymap {
    pub fn keys(&self) -> &'static [(char, u8)] {
        match self {
            Keymap::Conventional => &CHIP8_CONVENTIONAL_KEYMAP,
            Keymap::Literal => &CHIP8_LITERAL_KEYMAP,
        }
    }
}

/// A CHIP-8 interpreter for the terminal
///
/// Press Escape (or Ctrl-C) to quit. Set RUST_LOG=debug and redirect stderr
/// to see what the interpreter is doing.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// The ROM file to run
    pub rom: PathBuf,

    /// Instructions per second
    #[arg(short, long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND)]
    pub speed: u32,

    /// How to make the beep
    #[arg(long, value_enum, default_value_t = SoundDevice::Beep)]
    pub sound: SoundDevice,

    /// How keys map onto the hex keypad
    #[arg(short, long, value_enum, default_value_t = Keymap::Conventional)]
    pub keymap: Keymap,

    /// Seed for the random number opcode, for repeatable runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// How long a key press counts as held, in milliseconds
    #[arg(long, default_value_t = DEFAULT_KEY_HOLD_MS)]
    pub key_hold_ms: u64,
}

impl Config {
    /// time between instructions; never zero
    pub fn step_period(&self) -> Duration {
        Duration::from_secs(1) / self.speed.max(1)
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_secs(1) / FRAMES_PER_SECOND
    }

    pub fn key_hold(&self) -> Duration {
        Duration::from_millis(self.key_hold_ms)
    }
}
