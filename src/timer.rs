/// Rate the host is expected to call [`Timers::tick`] at, decoupled from
/// the instruction rate.
pub const TICKS_PER_SECOND: u64 = 60;

/// The two 8-bit countdowns. The sound timer's value is tracked so programs
/// can read the beep window, but no audio is generated here.
pub struct Timers {
    delay: u8,
    sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Self { delay: 0, sound: 0 }
    }

    pub fn reset(&mut self) {
        self.delay = 0;
        self.sound = 0;
    }

    /// One logical tick: each timer decrements while above zero.
    pub fn tick(&mut self) {
        if self.delay > 0 {
            self.delay -= 1;
        }
        if self.sound > 0 {
            self.sound -= 1;
        }
    }

    pub fn delay(&self) -> u8 {
        self.delay
    }

    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    pub fn sound(&self) -> u8 {
        self.sound
    }

    pub fn set_sound(&mut self, value: u8) {
        self.sound = value;
    }
}
