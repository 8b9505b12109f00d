//! # runner
//!
//! Drives an interpreter in real time. Instructions run at the configured
//! rate, timers and the screen at 60Hz; between deadlines the runner sleeps
//! with spin_sleep, which is accurate enough at 2ms granularity.
use crate::config::Config;
use crate::error::Error;
use crate::interpreter::{Chip8Interpreter, StepResult};
use crate::screen::Screen;
use log::{debug, info};
use std::time::{Duration, Instant};

/// how much work got done before the runner stopped
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub steps: u64,
    pub frames: u64,
}

pub struct Runner {
    step_period: Duration,
    frame_period: Duration,
}

// advance a deadline by one period, giving up on catching up when the loop
// has fallen more than `slack` behind (e.g. after blocking on a key)
fn next_deadline(deadline: Instant, period: Duration, now: Instant, slack: Duration) -> Instant {
    let next = deadline + period;
    if now > next + slack {
        now + period
    } else {
        next
    }
}

impl Runner {
    pub fn new(step_period: Duration, frame_period: Duration) -> Runner {
        Runner {
            step_period,
            frame_period,
        }
    }

    pub fn from_config(config: &Config) -> Runner {
        Runner::new(config.step_period(), config.frame_period())
    }

    /// Run until the keyboard asks to quit. Errors from the interpreter (a
    /// bad opcode, a broken stack) or from the screen stop the run.
    pub fn run(
        &self,
        interpreter: &mut Chip8Interpreter,
        screen: &mut dyn Screen,
    ) -> Result<RunStats, Error> {
        info!(
            "running at {:?} per instruction, {:?} per frame",
            self.step_period, self.frame_period
        );
        let mut stats = RunStats::default();
        let start = Instant::now();
        let mut next_step = start;
        let mut next_frame = start + self.frame_period;

        while !interpreter.quit_requested() {
            let now = Instant::now();
            if now >= next_frame {
                interpreter.tick_frame();
                screen.refresh(interpreter.display_mut())?;
                stats.frames += 1;
                next_frame = next_deadline(next_frame, self.frame_period, now, self.frame_period);
            }
            if now >= next_step {
                if interpreter.step()? == StepResult::Quit {
                    debug!("quit while waiting for a key");
                    break;
                }
                stats.steps += 1;
                next_step = next_deadline(next_step, self.step_period, now, self.frame_period);
            }

            let wake = next_step.min(next_frame);
            let now = Instant::now();
            if wake > now {
                spin_sleep::sleep(wake - now);
            }
        }

        info!(
            "stopped after {} instructions, {} frames, {:?}",
            stats.steps,
            stats.frames,
            start.elapsed()
        );
        Ok(stats)
    }
}
