use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

/// map of keys typed at the terminal to what the chip8 might expect
/// where '1' => 0x01 and 'a' => 0x0a
pub const CHIP8_LITERAL_KEYMAP: [(char, u8); 16] = [
    ('0', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('4', 0x04),
    ('5', 0x05),
    ('6', 0x06),
    ('7', 0x07),
    ('8', 0x08),
    ('9', 0x09),
    ('a', 0x0a),
    ('b', 0x0b),
    ('c', 0x0c),
    ('d', 0x0d),
    ('e', 0x0e),
    ('f', 0x0f),
];

/// ditto using left-hand side of qwerty keyboard
///   1 2 3 C      1 2 3 4
///   4 5 6 D      q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
pub const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// The hex keypad, as the interpreter sees it.
///
/// Quitting is up to the host: an implementation signals it by returning
/// `None` from `wait_for_key` and `true` from `quit_requested`.
pub trait Keyboard {
    /// is hex key `key` (0x0-0xf) held down right now
    fn is_key_pressed(&mut self, key: u8) -> bool;

    /// block until a hex key is pressed; `None` if the host wants to stop
    fn wait_for_key(&mut self) -> Option<u8>;

    /// has the user asked to stop
    fn quit_requested(&mut self) -> bool {
        false
    }
}

/// Keyboard reading key events from the terminal, using crossterm.
///
/// Terminals only report key presses, never releases, so a key counts as
/// held for `hold` after its last press (auto-repeat keeps it held).
pub struct TerminalInput {
    keymap: HashMap<char, u8>,
    pressed: [Option<Instant>; 16],
    hold: Duration,
    quit: bool,
}

impl TerminalInput {
    pub fn new(keymap: &[(char, u8)], hold: Duration) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TerminalInput {
            keymap: keymap.iter().copied().collect(),
            pressed: [None; 16],
            hold,
            quit: false,
        })
    }

    /// handle one terminal event, returning the hex key it maps to
    fn handle(&mut self, event: Event) -> Option<u8> {
        match event {
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers,
                ..
            }) if modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true;
                None
            }
            Event::Key(KeyEvent {
                code: KeyCode::Esc, ..
            }) => {
                self.quit = true;
                None
            }
            Event::Key(KeyEvent {
                code: KeyCode::Char(key),
                ..
            }) => match self.keymap.get(&key.to_ascii_lowercase()) {
                Some(mapped_key) => {
                    self.pressed[*mapped_key as usize] = Some(Instant::now());
                    Some(*mapped_key)
                }
                None => {
                    warn!("can't map {:?} to a CHIP-8 key", key);
                    None
                }
            },
            _ => None,
        }
    }

    /// drain whatever the terminal has queued up, without blocking
    fn read_pending(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            let event = read()?;
            self.handle(event);
        }
        Ok(())
    }

    fn poll_or_quit(&mut self) {
        if let Err(e) = self.read_pending() {
            warn!("reading the terminal failed, stopping: {}", e);
            self.quit = true;
        }
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("couldn't restore the terminal: {}", e);
        }
    }
}

impl Keyboard for TerminalInput {
    fn is_key_pressed(&mut self, key: u8) -> bool {
        self.poll_or_quit();
        match self.pressed.get(key as usize).copied().flatten() {
            Some(at) => at.elapsed() < self.hold,
            None => false,
        }
    }

    fn wait_for_key(&mut self) -> Option<u8> {
        debug!("waiting for a key");
        while !self.quit {
            match read() {
                Ok(event) => {
                    if let Some(key) = self.handle(event) {
                        return Some(key);
                    }
                }
                Err(e) => {
                    warn!("reading the terminal failed, stopping: {}", e);
                    self.quit = true;
                }
            }
        }
        None
    }

    fn quit_requested(&mut self) -> bool {
        self.poll_or_quit();
        self.quit
    }
}

/// dummy Keyboard implementation for testing: a set of held keys plus a
/// queue of keys to hand out to `wait_for_key`
pub struct DummyInput {
    held: Vec<u8>,
    queued: VecDeque<u8>,
}

impl DummyInput {
    pub fn new(held: &[u8]) -> Self {
        DummyInput {
            held: Vec::from(held),
            queued: VecDeque::new(),
        }
    }

    /// keys returned, in order, by successive waits. once they run out,
    /// waiting reports a quit
    pub fn with_queued(mut self, keys: &[u8]) -> Self {
        self.queued.extend(keys);
        self
    }
}

impl Keyboard for DummyInput {
    fn is_key_pressed(&mut self, key: u8) -> bool {
        self.held.contains(&key)
    }

    fn wait_for_key(&mut self) -> Option<u8> {
        self.queued.pop_front()
    }
}
