use std::error::Error;
use std::fs::File;

use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use chip8_term::config::{Config, SoundDevice};
use chip8_term::input::TerminalInput;
use chip8_term::interpreter::Chip8Interpreter;
use chip8_term::runner::Runner;
use chip8_term::screen::MonoTermScreen;
use chip8_term::sound::{Mute, SimpleBeep, Sound, TerminalBell};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let config = Config::parse();

    // open the ROM before touching the terminal, so a bad path reads cleanly
    let mut f = File::open(&config.rom)?;
    info!("loading {}", config.rom.display());

    let mut sound: Box<dyn Sound> = match config.sound {
        SoundDevice::Beep => Box::new(SimpleBeep::new()),
        SoundDevice::Bell => Box::new(TerminalBell::new()),
        SoundDevice::Mute => Box::new(Mute::new()),
    };
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // initialise; the screen goes first so it is restored last
    let mut screen = MonoTermScreen::new()?;
    let mut input = TerminalInput::new(config.keymap.keys(), config.key_hold())?;
    let mut interpreter = Chip8Interpreter::new(&mut input, sound.as_mut(), &mut rng);

    interpreter.load_program(&mut f)?;
    Runner::from_config(&config).run(&mut interpreter, &mut screen)?;
    Ok(())
}
