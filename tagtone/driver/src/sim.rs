//! Host-side timer simulator
//!
//! [`SimTimer`] keeps an image of the registers a real channel exposes plus
//! one output port byte, so the generators can be exercised without
//! hardware. Compare matches are injected by calling the generator's
//! handler, usually through [`run_until_idle`].

use heapless::Vec;
use tagtone_core::{Prescaler, TimerChannel};

use crate::gpio::OutputPin;
use crate::timer::{CompareMatch, TimerController};

/// Register writes kept by the simulator, oldest first
pub const WRITE_LOG_CAPACITY: usize = 32;

/// One register write seen by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterWrite {
    Ctc,
    ClockSelect(u8),
    Compare(u16),
    InterruptEnable(bool),
}

#[cfg(feature = "defmt")]
impl defmt::Format for RegisterWrite {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Ctc => defmt::write!(fmt, "Ctc"),
            Self::ClockSelect(bits) => defmt::write!(fmt, "ClockSelect({=u8:#b})", bits),
            Self::Compare(value) => defmt::write!(fmt, "Compare({})", value),
            Self::InterruptEnable(on) => defmt::write!(fmt, "InterruptEnable({})", on),
        }
    }
}

/// Simulated timer channel with its output port
#[derive(Debug, Clone)]
pub struct SimTimer {
    channel: TimerChannel,
    ctc: bool,
    clock_select: u8,
    compare: u16,
    interrupt_enabled: bool,
    port: u8,
    toggles: u32,
    writes: Vec<RegisterWrite, WRITE_LOG_CAPACITY>,
}

impl SimTimer {
    pub const fn new(channel: TimerChannel) -> Self {
        Self {
            channel,
            ctc: false,
            clock_select: 0,
            compare: 0,
            interrupt_enabled: false,
            port: 0,
            toggles: 0,
            writes: Vec::new(),
        }
    }

    pub fn is_ctc(&self) -> bool {
        self.ctc
    }

    /// Clock-select field; zero means the counter is stopped
    pub fn clock_select(&self) -> u8 {
        self.clock_select
    }

    pub fn compare(&self) -> u16 {
        self.compare
    }

    /// Raw value of the simulated output port
    pub fn port(&self) -> u8 {
        self.port
    }

    pub fn is_high(&self, pin: OutputPin) -> bool {
        pin.is_high_in(self.port)
    }

    /// Number of `toggle_pin` calls since creation
    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    pub fn writes(&self) -> &[RegisterWrite] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    fn record(&mut self, write: RegisterWrite) {
        if self.writes.is_full() {
            self.writes.remove(0);
        }
        self.writes.push(write).ok();
    }
}

impl TimerController for SimTimer {
    fn channel(&self) -> TimerChannel {
        self.channel
    }

    fn configure_ctc(&mut self) {
        self.ctc = true;
        self.clock_select = 0;
        self.record(RegisterWrite::Ctc);
    }

    fn set_prescaler(&mut self, prescaler: Prescaler) {
        // Unsupported dividers leave the clock stopped, as on silicon.
        self.clock_select = self.channel.clock_select(prescaler).unwrap_or(0);
        self.record(RegisterWrite::ClockSelect(self.clock_select));
    }

    fn set_compare_value(&mut self, value: u16) {
        self.compare = value;
        self.record(RegisterWrite::Compare(value));
    }

    fn enable_interrupt(&mut self) {
        self.interrupt_enabled = true;
        self.record(RegisterWrite::InterruptEnable(true));
    }

    fn disable_interrupt(&mut self) {
        self.interrupt_enabled = false;
        self.record(RegisterWrite::InterruptEnable(false));
    }

    fn is_interrupt_enabled(&self) -> bool {
        self.interrupt_enabled
    }

    fn toggle_pin(&mut self, pin: OutputPin) {
        self.port ^= pin.mask;
        self.toggles += 1;
    }

    fn set_pin_low(&mut self, pin: OutputPin) {
        self.port &= !pin.mask;
    }
}

/// Deliver compare matches while the handler keeps its interrupt enabled.
///
/// Stops after `max_events` so an indefinite play cannot hang a test.
/// Returns the number of events delivered.
pub fn run_until_idle<H: CompareMatch>(handler: &H, max_events: u32) -> u32 {
    let mut events = 0;
    while events < max_events && handler.is_playing() {
        handler.on_compare_match();
        events += 1;
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::PORTD;

    #[test]
    fn test_toggle_and_force_low() {
        let pin = OutputPin::new(PORTD, 0b0000_0100);
        let other = OutputPin::new(PORTD, 0b0000_0001);
        let mut timer = SimTimer::new(TimerChannel::Channel2);

        timer.toggle_pin(other);
        timer.toggle_pin(pin);
        assert!(timer.is_high(pin));
        timer.set_pin_low(pin);
        assert!(!timer.is_high(pin));
        assert!(timer.is_high(other));
        assert_eq!(timer.toggles(), 2);
    }

    #[test]
    fn test_unsupported_prescaler_stops_clock() {
        let mut timer = SimTimer::new(TimerChannel::Channel1);
        timer.set_prescaler(Prescaler::Div32);
        assert_eq!(timer.clock_select(), 0);
        timer.set_prescaler(Prescaler::Div64);
        assert_eq!(timer.clock_select(), 0b011);
    }

    #[test]
    fn test_write_log_keeps_latest() {
        let mut timer = SimTimer::new(TimerChannel::Channel1);
        for value in 0..(WRITE_LOG_CAPACITY as u16 + 4) {
            timer.set_compare_value(value);
        }
        assert_eq!(timer.writes().len(), WRITE_LOG_CAPACITY);
        assert_eq!(timer.writes()[0], RegisterWrite::Compare(4));
        assert_eq!(
            timer.writes()[WRITE_LOG_CAPACITY - 1],
            RegisterWrite::Compare(WRITE_LOG_CAPACITY as u16 + 3)
        );
    }
}
