//! A CHIP-8 interpreter that plays in the terminal.
//!
//! ## Design
//!
//! * the interpreter owns the machine: cpu, memory, framebuffer
//! * the host owns the devices: keyboard, sound, screen, randomness. The
//!   interpreter borrows them through traits so any kind of device works,
//!   starting with TUI in-console
//! * timing is driven from outside: instructions run as fast as possible
//!   then sleep until the next deadline, so not quite authentic
//!
//! Model
//!
//! main
//!  |-- config (command line)
//!  |-- keyboard, sound, screen, rng
//!  |-- interpreter(keyboard, sound, rng)
//!  |    |-- cpu: registers, stack, timers
//!  |    |-- memory: font + program
//!  |    `-- display: framebuffer
//!  `-- runner
//!       |-- every 1/speed s: interpreter.step()
//!       |-- every 1/60 s:    interpreter.tick_frame(); screen.refresh()
//!       `-- sleep until whichever comes first
pub mod config;
pub mod cpu;
pub mod display;
pub mod error;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod runner;
pub mod screen;
pub mod sound;
pub mod timer;

pub use error::Error;
