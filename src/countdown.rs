/// Number of tenths of a second in one second.
pub const TENTHS_PER_SEC: u32 = 10;

/// Convert seconds to whole tenths, rounding to the nearest tenth.
pub fn secs_to_tenths(secs: f64) -> u32 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * TENTHS_PER_SEC as f64).round() as u32
}

pub fn tenths_to_secs(tenths: u32) -> f64 {
    tenths as f64 / TENTHS_PER_SEC as f64
}

/// Per-attempt countdown kept in tenths of a second so repeated ticks
/// never accumulate floating point error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    initial: u32,
    left: u32,
}

impl Countdown {
    pub fn new(initial_tenths: u32) -> Self {
        Self {
            initial: initial_tenths,
            left: initial_tenths,
        }
    }

    pub fn initial_tenths(&self) -> u32 {
        self.initial
    }

    pub fn tenths_left(&self) -> u32 {
        self.left
    }

    pub fn tenths_elapsed(&self) -> u32 {
        self.initial - self.left
    }

    pub fn seconds_left(&self) -> f64 {
        tenths_to_secs(self.left)
    }

    /// Fraction of the countdown still remaining, in [0, 1].
    pub fn remaining_ratio(&self) -> f64 {
        if self.initial == 0 {
            return 0.0;
        }
        self.left as f64 / self.initial as f64
    }

    pub fn restart(&mut self) {
        self.left = self.initial;
    }

    /// Advance one tenth. Returns true when this step expired the countdown.
    ///
    /// A countdown holding one tenth or less clamps to zero instead of
    /// decrementing, so the expiring step always lands exactly on 0.0.
    pub fn step(&mut self) -> bool {
        if self.left <= 1 {
            self.left = 0;
            return true;
        }
        self.left -= 1;
        false
    }
}
