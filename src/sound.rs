use beep::beep;
use log::warn;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

/// Makes the beep when the sound timer runs out. Fire and forget: failures
/// are logged by the implementation, never reported back.
pub trait Sound {
    fn play(&mut self);
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C
const SIMPLEBEEP_LENGTH: Duration = Duration::from_millis(100);

/// PC speaker tone, using the beep crate. The tone is stopped again from a
/// background thread so playing never blocks the interpreter.
pub struct SimpleBeep {
    pitch: u16,
    length: Duration,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep {
            pitch: SIMPLEBEEP_PITCH,
            length: SIMPLEBEEP_LENGTH,
        }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn play(&mut self) {
        let pitch = self.pitch;
        let length = self.length;
        thread::spawn(move || {
            if let Err(e) = beep(pitch) {
                warn!("beep failed: {}", e);
                return;
            }
            spin_sleep::sleep(length);
            if let Err(e) = beep(0) {
                warn!("couldn't stop beep: {}", e);
            }
        });
    }
}

/// rings the terminal bell (BEL) on stdout
pub struct TerminalBell;

impl TerminalBell {
    pub fn new() -> Self {
        TerminalBell
    }

    fn ring(&self) -> Result<(), io::Error> {
        let mut out = io::stdout();
        out.write_all(b"\x07")?;
        out.flush()
    }
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for TerminalBell {
    fn play(&mut self) {
        if let Err(e) = self.ring() {
            warn!("terminal bell failed: {}", e);
        }
    }
}

pub struct Mute {}
impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}
impl Default for Mute {
    fn default() -> Self {
        Self::new()
    }
}
impl Sound for Mute {
    fn play(&mut self) {}
}

/// counts how often it was played; for tests
#[derive(Default)]
pub struct CountingSound {
    pub plays: usize,
}

impl Sound for CountingSound {
    fn play(&mut self) {
        self.plays += 1;
    }
}
