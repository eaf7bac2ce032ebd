//! Gated carrier generator
//!
//! Channel 2 toggles the pin at the carrier rate. A second counter, running
//! off the same compare matches, flips a `signal_on` flag every
//! `gate_cycle` events; while the flag is clear the pin is held low. The
//! result is the carrier keyed on and off at the signal rate for one burst.

use core::cell::RefCell;

use critical_section::Mutex;
use log::debug;
use tagtone_core::{PulseConfig, TimerChannel, ToggleBudget};

use crate::channel::{ChannelCore, ChannelStatus, GeneratorState};
use crate::error::{HalError, HalResult};
use crate::gpio::OutputPin;
use crate::timer::{CompareMatch, TimerController};

/// Carrier channel state plus the gating counter
struct CarrierChannel<T> {
    core: ChannelCore<T>,
    toggle_count: i32,
    gate_cycle: u32,
    gate: u32,
    signal_on: bool,
}

impl<T: TimerController> CarrierChannel<T> {
    fn on_compare_match(&mut self) {
        let Some(pin) = self.core.pin else {
            self.core.timer.disable_interrupt();
            return;
        };

        if self.gate != 0 {
            if self.signal_on {
                self.core.timer.toggle_pin(pin);
            }
            self.core.budget.consume();
            if self.core.budget.is_idle() {
                self.core.halt();
            }
            self.gate -= 1;
        } else {
            self.gate = self.gate_cycle;
            self.signal_on = !self.signal_on;
            if self.signal_on {
                self.core.timer.toggle_pin(pin);
            } else {
                self.core.timer.set_pin_low(pin);
            }
            self.core.budget.consume();
            if self.core.budget.is_idle() {
                self.core.halt();
            }
        }
    }
}

/// Carrier-specific view returned by [`CarrierGenerator::status`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarrierStatus {
    pub channel: ChannelStatus,
    pub toggle_count: i32,
    pub gate_cycle: u32,
    pub gate_remaining: u32,
    pub signal_on: bool,
}

#[cfg(feature = "defmt")]
impl defmt::Format for CarrierStatus {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{} gate={}/{} on={}",
            self.channel,
            self.gate_remaining,
            self.gate_cycle,
            self.signal_on
        );
    }
}

/// Fixed-length gated carrier burst on one timer channel.
///
/// Meant to live in a `static` so the compare-match vector can reach it:
///
/// ```ignore
/// static CARRIER: CarrierGenerator<Atmega328Timer> =
///     CarrierGenerator::new(Atmega328Timer::timer2(), PulseConfig::DEFAULT);
///
/// #[avr_device::interrupt(atmega328p)]
/// fn TIMER2_COMPA() {
///     CARRIER.on_compare_match();
/// }
/// ```
pub struct CarrierGenerator<T> {
    config: PulseConfig,
    channel: Mutex<RefCell<CarrierChannel<T>>>,
}

impl<T: TimerController> CarrierGenerator<T> {
    pub const fn new(timer: T, config: PulseConfig) -> Self {
        Self {
            config,
            channel: Mutex::new(RefCell::new(CarrierChannel {
                core: ChannelCore::new(timer),
                toggle_count: 0,
                gate_cycle: 0,
                gate: 0,
                signal_on: true,
            })),
        }
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    /// Timer channel this generator drives
    pub fn channel(&self) -> TimerChannel {
        critical_section::with(|cs| self.channel.borrow_ref(cs).core.timer.channel())
    }

    /// Bind `pin` and derive the burst's register values.
    ///
    /// Running this again with the same pin yields the same values.
    pub fn configure(&self, pin: OutputPin) {
        let program = self.config.carrier_program();
        let toggle_count = self.config.carrier_toggle_count();
        let gate_cycle = self.config.gate_cycle();

        let channel = critical_section::with(|cs| {
            let mut carrier = self.channel.borrow_ref_mut(cs);
            carrier.core.configure(pin, program);
            carrier.toggle_count = toggle_count;
            carrier.gate_cycle = gate_cycle;
            carrier.core.timer.channel()
        });

        debug!(
            "{}: carrier {} Hz, {}, {} toggles, gate every {}",
            channel, self.config.carrier_hz, program, toggle_count, gate_cycle
        );
    }

    /// Start one burst, restarting any burst already in flight.
    pub fn play(&self) -> HalResult<()> {
        critical_section::with(|cs| {
            let mut carrier = self.channel.borrow_ref_mut(cs);
            if carrier.core.pin.is_none() {
                return Err(HalError::NotConfigured);
            }
            carrier.gate = carrier.gate_cycle;
            carrier.signal_on = true;
            let budget = ToggleBudget::new(carrier.toggle_count);
            carrier.core.arm(budget);
            Ok(())
        })?;

        debug!("carrier burst armed");
        Ok(())
    }

    /// Mask the interrupt and force the pin low.
    pub fn stop(&self) {
        critical_section::with(|cs| {
            let mut carrier = self.channel.borrow_ref_mut(cs);
            carrier.core.halt();
            carrier.core.budget = ToggleBudget::IDLE;
        });
        debug!("carrier stopped");
    }

    pub fn is_playing(&self) -> bool {
        critical_section::with(|cs| self.channel.borrow_ref(cs).core.is_armed())
    }

    pub fn state(&self) -> GeneratorState {
        if self.is_playing() {
            GeneratorState::Armed
        } else {
            GeneratorState::Idle
        }
    }

    pub fn status(&self) -> CarrierStatus {
        critical_section::with(|cs| {
            let carrier = self.channel.borrow_ref(cs);
            CarrierStatus {
                channel: carrier.core.status(),
                toggle_count: carrier.toggle_count,
                gate_cycle: carrier.gate_cycle,
                gate_remaining: carrier.gate,
                signal_on: carrier.signal_on,
            }
        })
    }

    /// Run `f` against the timer backend inside the critical section
    pub fn with_timer<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        critical_section::with(|cs| f(&mut self.channel.borrow_ref_mut(cs).core.timer))
    }

    /// Compare-match handler; call from the channel's interrupt vector.
    pub fn on_compare_match(&self) {
        critical_section::with(|cs| self.channel.borrow_ref_mut(cs).on_compare_match());
    }
}

impl<T: TimerController> CompareMatch for CarrierGenerator<T> {
    fn on_compare_match(&self) {
        CarrierGenerator::on_compare_match(self)
    }

    fn is_playing(&self) -> bool {
        CarrierGenerator::is_playing(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::{PinResolver, UnoPins};
    use crate::sim::SimTimer;

    fn generator() -> CarrierGenerator<SimTimer> {
        CarrierGenerator::new(SimTimer::new(TimerChannel::Channel2), PulseConfig::DEFAULT)
    }

    fn pin() -> OutputPin {
        UnoPins.resolve(3).unwrap()
    }

    #[test]
    fn test_configure_programs_timer() {
        let carrier = generator();
        carrier.configure(pin());

        let status = carrier.status();
        assert_eq!(status.channel.program.compare, 137);
        assert_eq!(status.toggle_count, 5760);
        assert_eq!(status.gate_cycle, 32);
        assert_eq!(status.channel.state, GeneratorState::Idle);

        carrier.with_timer(|timer| {
            assert!(timer.is_ctc());
            assert_eq!(timer.clock_select(), 0b001);
            assert!(!timer.is_interrupt_enabled());
        });
    }

    #[test]
    fn test_play_without_pin_fails() {
        let carrier = generator();
        assert_eq!(carrier.play(), Err(HalError::NotConfigured));
        assert!(!carrier.is_playing());
    }

    #[test]
    fn test_play_arms_channel() {
        let carrier = generator();
        carrier.configure(pin());
        carrier.play().unwrap();

        assert!(carrier.is_playing());
        assert_eq!(carrier.state(), GeneratorState::Armed);
        let status = carrier.status();
        assert_eq!(status.channel.budget, ToggleBudget::new(5760));
        assert_eq!(status.gate_remaining, 32);
        assert!(status.signal_on);
        carrier.with_timer(|timer| assert_eq!(timer.compare(), 137));
    }

    #[test]
    fn test_first_events_toggle_carrier() {
        let carrier = generator();
        let pin = pin();
        carrier.configure(pin);
        carrier.play().unwrap();

        carrier.on_compare_match();
        assert!(carrier.with_timer(|timer| timer.is_high(pin)));
        carrier.on_compare_match();
        assert!(!carrier.with_timer(|timer| timer.is_high(pin)));

        let status = carrier.status();
        assert_eq!(status.channel.budget, ToggleBudget::new(5758));
        assert_eq!(status.gate_remaining, 30);
    }

    #[test]
    fn test_gate_flip_forces_low() {
        let carrier = generator();
        let pin = pin();
        carrier.configure(pin);
        carrier.play().unwrap();

        // 31 toggles leave the pin high before the gate closes.
        for _ in 0..31 {
            carrier.on_compare_match();
        }
        assert!(carrier.with_timer(|timer| timer.is_high(pin)));
        carrier.on_compare_match();
        carrier.on_compare_match();

        let status = carrier.status();
        assert!(!status.signal_on);
        assert_eq!(status.gate_remaining, 32);
        assert!(!carrier.with_timer(|timer| timer.is_high(pin)));
    }

    #[test]
    fn test_stop_mid_burst() {
        let carrier = generator();
        let pin = pin();
        carrier.configure(pin);
        carrier.play().unwrap();
        carrier.on_compare_match();
        assert!(carrier.with_timer(|timer| timer.is_high(pin)));

        carrier.stop();
        assert!(!carrier.is_playing());
        assert!(!carrier.with_timer(|timer| timer.is_high(pin)));
        assert!(carrier.status().channel.budget.is_idle());
    }

    #[test]
    fn test_spurious_match_without_pin_masks_interrupt() {
        let carrier = generator();
        carrier.with_timer(|timer| timer.enable_interrupt());
        carrier.on_compare_match();
        assert!(!carrier.is_playing());
    }
}
