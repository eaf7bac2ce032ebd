//! Toggle budget bookkeeping shared by both generators

use core::fmt;

use crate::frequency::FrequencyProgrammer;

/// Remaining compare-match events for a channel.
///
/// Negative runs until stopped, zero is idle, positive counts down by one per
/// event. Only a new play raises it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ToggleBudget(i32);

impl ToggleBudget {
    /// Stopped channel
    pub const IDLE: Self = Self(0);

    /// Toggle until an explicit stop
    pub const INDEFINITE: Self = Self(-1);

    pub const fn new(count: i32) -> Self {
        Self(count)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn is_idle(self) -> bool {
        self.0 == 0
    }

    pub const fn is_indefinite(self) -> bool {
        self.0 < 0
    }

    /// Spend one event. Returns `true` when this call exhausted the budget.
    pub fn consume(&mut self) -> bool {
        if self.0 > 0 {
            self.0 -= 1;
            self.0 == 0
        } else {
            false
        }
    }
}

impl Default for ToggleBudget {
    fn default() -> Self {
        Self::IDLE
    }
}

impl fmt::Display for ToggleBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_indefinite() {
            write!(f, "indefinite")
        } else {
            write!(f, "{} toggles", self.0)
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ToggleBudget {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "ToggleBudget({})", self.0);
    }
}

/// How long a signal play should last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayDuration {
    /// Fixed length in milliseconds
    Millis(u32),
    /// Until `stop()` or the next play
    Indefinite,
}

impl PlayDuration {
    /// Budget that sustains `frequency_hz` for this duration
    pub fn budget(self, frequency_hz: u32) -> ToggleBudget {
        match self {
            Self::Millis(ms) => ToggleBudget::new(FrequencyProgrammer::toggle_count(frequency_hz, ms)),
            Self::Indefinite => ToggleBudget::INDEFINITE,
        }
    }
}

impl From<u32> for PlayDuration {
    fn from(ms: u32) -> Self {
        Self::Millis(ms)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PlayDuration {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Millis(ms) => defmt::write!(fmt, "{}ms", ms),
            Self::Indefinite => defmt::write!(fmt, "Indefinite"),
        }
    }
}
