use crate::display::DisplayMode;
use std::io;

/// Everything that can stop the interpreter. None of these are recoverable:
/// the run ends and the error is reported to whoever is driving it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ROM is too large ({size} bytes), at most {max_size} bytes fit in program space")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("unsupported opcode {opcode:#06x}")]
    UnsupportedOpcode { opcode: u16 },

    #[error("display mode {0:?} is not supported")]
    NotSupported(DisplayMode),

    #[error("stack overflow calling {addr:#05x}: all 16 return slots are in use")]
    StackOverflow { addr: u16 },

    #[error("stack underflow: returned from a subroutine with an empty call stack")]
    StackUnderflow,

    #[error(transparent)]
    Io(#[from] io::Error),
}
