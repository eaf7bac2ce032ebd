//! Compare-value and toggle-count arithmetic
//!
//! A timer in clear-on-compare mode fires once every `(compare + 1) *
//! prescaler` CPU cycles. Toggling the output pin on every match therefore
//! produces a square wave whose period spans two matches:
//!
//! ```text
//! compare = cpu_clock / (target * 2 * prescaler) - 1
//! ```

use core::fmt;

use crate::channel::{Prescaler, TimerChannel, TimerWidth};

/// Errors reported while searching for a usable timer program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramError {
    /// Target frequency of zero
    ZeroFrequency,
    /// Target frequency is above what the clock can toggle even at `clk/1`
    FrequencyTooHigh { target_hz: u32 },
    /// No prescaler keeps the compare value inside the counter
    CompareOverflow { target_hz: u32, width: TimerWidth },
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroFrequency => write!(f, "target frequency is zero"),
            Self::FrequencyTooHigh { target_hz } => {
                write!(f, "{} Hz is above the toggle limit of the clock", target_hz)
            }
            Self::CompareOverflow { target_hz, width } => {
                write!(f, "{} Hz does not fit a {} compare register", target_hz, width)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProgramError {}

#[cfg(feature = "defmt")]
impl defmt::Format for ProgramError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ZeroFrequency => defmt::write!(fmt, "ZeroFrequency"),
            Self::FrequencyTooHigh { target_hz } => {
                defmt::write!(fmt, "FrequencyTooHigh({}Hz)", target_hz)
            }
            Self::CompareOverflow { target_hz, width } => {
                defmt::write!(fmt, "CompareOverflow({}Hz, {})", target_hz, width)
            }
        }
    }
}

/// Prescaler and compare value for one timer channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerProgram {
    pub prescaler: Prescaler,
    pub compare: u16,
}

impl TimerProgram {
    /// CPU cycles between two compare matches
    pub const fn cycles_per_match(&self) -> u64 {
        (self.compare as u64 + 1) * self.prescaler.divisor() as u64
    }

    /// Time between two consecutive pin toggles, in nanoseconds
    pub fn toggle_interval_ns(&self, cpu_clock_hz: u32) -> u64 {
        self.cycles_per_match() * 1_000_000_000 / cpu_clock_hz as u64
    }

    /// Period of the generated square wave (two toggles), in nanoseconds
    pub fn wave_period_ns(&self, cpu_clock_hz: u32) -> u64 {
        2 * self.cycles_per_match() * 1_000_000_000 / cpu_clock_hz as u64
    }

    /// Frequency actually produced, which differs from the target by the
    /// integer truncation of the compare value
    pub fn actual_frequency_hz(&self, cpu_clock_hz: u32) -> u32 {
        (cpu_clock_hz as u64 / (2 * self.cycles_per_match())) as u32
    }
}

impl fmt::Display for TimerProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ocr={}", self.prescaler, self.compare)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerProgram {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{} ocr={}", self.prescaler, self.compare);
    }
}

/// Derives timer programs and toggle counts from target frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyProgrammer {
    cpu_clock_hz: u32,
}

impl FrequencyProgrammer {
    pub const fn new(cpu_clock_hz: u32) -> Self {
        Self { cpu_clock_hz }
    }

    pub const fn cpu_clock_hz(&self) -> u32 {
        self.cpu_clock_hz
    }

    /// Raw compare value for `target_hz` at `prescaler`.
    ///
    /// Returns `None` when the target is zero or so high that the quotient
    /// drops below one match per half period.
    pub fn compare_value(&self, target_hz: u32, prescaler: Prescaler) -> Option<u32> {
        let divisor = target_hz as u64 * 2 * prescaler.divisor() as u64;
        let quotient = (self.cpu_clock_hz as u64).checked_div(divisor)?;
        quotient.checked_sub(1).map(|value| value.min(u32::MAX as u64) as u32)
    }

    /// Program for a fixed prescaler.
    ///
    /// Never fails: a compare value outside the counter saturates at the
    /// width maximum, and an unreachable frequency yields zero. Callers that
    /// need to know should use [`FrequencyProgrammer::check`].
    pub fn program(&self, target_hz: u32, prescaler: Prescaler, width: TimerWidth) -> TimerProgram {
        let compare = self
            .compare_value(target_hz, prescaler)
            .unwrap_or(0)
            .min(width.max_compare());
        TimerProgram {
            prescaler,
            compare: compare as u16,
        }
    }

    /// Program for a fixed prescaler, rejecting values the counter cannot hold
    pub fn check(
        &self,
        target_hz: u32,
        prescaler: Prescaler,
        width: TimerWidth,
    ) -> Result<TimerProgram, ProgramError> {
        if target_hz == 0 {
            return Err(ProgramError::ZeroFrequency);
        }
        let compare = self
            .compare_value(target_hz, prescaler)
            .ok_or(ProgramError::FrequencyTooHigh { target_hz })?;
        if compare > width.max_compare() {
            return Err(ProgramError::CompareOverflow { target_hz, width });
        }
        Ok(TimerProgram {
            prescaler,
            compare: compare as u16,
        })
    }

    /// Smallest supported prescaler of `channel` whose compare value fits
    pub fn select(&self, target_hz: u32, channel: TimerChannel) -> Result<TimerProgram, ProgramError> {
        let mut last = ProgramError::ZeroFrequency;
        for prescaler in channel.prescalers() {
            match self.check(target_hz, *prescaler, channel.width()) {
                Ok(program) => return Ok(program),
                Err(ProgramError::CompareOverflow { .. }) => {
                    last = ProgramError::CompareOverflow {
                        target_hz,
                        width: channel.width(),
                    };
                }
                // A larger divider only lowers the quotient further.
                Err(err) => return Err(err),
            }
        }
        Err(last)
    }

    /// Pin toggles needed to sustain `target_hz` for `duration_ms`.
    ///
    /// A full cycle is two toggles. Saturates at `i32::MAX` so the result
    /// always fits a positive toggle budget.
    pub fn toggle_count(target_hz: u32, duration_ms: u32) -> i32 {
        let toggles = (2 * target_hz as u64).saturating_mul(duration_ms as u64) / 1000;
        toggles.min(i32::MAX as u64) as i32
    }

    /// Carrier toggles per half period of the gating signal.
    ///
    /// 57 600 Hz / 1 800 Hz gives 32. Zero when the signal is faster than
    /// the carrier or is 0 Hz.
    pub fn gate_cycle(carrier_hz: u32, signal_hz: u32) -> u32 {
        carrier_hz.checked_div(signal_hz).unwrap_or(0)
    }
}
