/// An 8-bit countdown ticked at 60Hz. Used for both the delay and the sound
/// timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    value: u8,
    completed: bool,
}

impl Timer {
    pub fn new() -> Self {
        Timer {
            value: 0,
            completed: true,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// count down one frame. returns true only on the tick that reached zero
    pub fn tick(&mut self) -> bool {
        if self.completed || self.value == 0 {
            return false;
        }
        self.value -= 1;
        if self.value == 0 {
            self.completed = true;
        }
        self.completed
    }

    pub fn reset(&mut self) {
        self.value = 0;
        self.completed = true;
    }

    pub fn set_value(&mut self, value: u8) {
        self.value = value;
        self.completed = value == 0;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
