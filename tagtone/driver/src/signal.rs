//! Bare signal generator on the 16-bit timer

use core::cell::RefCell;

use critical_section::Mutex;
use log::debug;
use tagtone_core::{PlayDuration, PulseConfig, TimerChannel, ToggleBudget};

use crate::channel::{ChannelCore, ChannelStatus, GeneratorState};
use crate::error::{HalError, HalResult};
use crate::gpio::OutputPin;
use crate::timer::{CompareMatch, TimerController};

impl<T: TimerController> ChannelCore<T> {
    fn on_signal_match(&mut self) {
        let Some(pin) = self.pin else {
            self.timer.disable_interrupt();
            return;
        };

        if self.budget.is_idle() {
            self.halt();
            return;
        }
        self.timer.toggle_pin(pin);
        if self.budget.consume() {
            self.halt();
        }
    }
}

/// Square wave at the signal frequency for a caller-chosen duration.
pub struct SignalGenerator<T> {
    config: PulseConfig,
    channel: Mutex<RefCell<ChannelCore<T>>>,
}

impl<T: TimerController> SignalGenerator<T> {
    pub const fn new(timer: T, config: PulseConfig) -> Self {
        Self {
            config,
            channel: Mutex::new(RefCell::new(ChannelCore::new(timer))),
        }
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    pub fn channel(&self) -> TimerChannel {
        critical_section::with(|cs| self.channel.borrow_ref(cs).timer.channel())
    }

    /// Bind `pin` and program the timer for the signal frequency
    pub fn configure(&self, pin: OutputPin) {
        let program = self.config.signal_program();
        let channel = critical_section::with(|cs| {
            let mut signal = self.channel.borrow_ref_mut(cs);
            signal.configure(pin, program);
            signal.timer.channel()
        });
        debug!("{}: signal {} Hz, {}", channel, self.config.signal_hz, program);
    }

    /// Play for `duration_ms` milliseconds
    pub fn play(&self, duration_ms: u32) -> HalResult<()> {
        self.play_for(PlayDuration::Millis(duration_ms))
    }

    /// Play for `duration`, replacing whatever budget is left
    pub fn play_for(&self, duration: PlayDuration) -> HalResult<()> {
        let budget = duration.budget(self.config.signal_hz);
        critical_section::with(|cs| {
            let mut signal = self.channel.borrow_ref_mut(cs);
            if signal.pin.is_none() {
                return Err(HalError::NotConfigured);
            }
            signal.arm(budget);
            Ok(())
        })?;

        debug!("signal armed for {}", budget);
        Ok(())
    }

    /// Mask the interrupt and force the pin low.
    pub fn stop(&self) {
        critical_section::with(|cs| {
            let mut signal = self.channel.borrow_ref_mut(cs);
            signal.halt();
            signal.budget = ToggleBudget::IDLE;
        });
        debug!("signal stopped");
    }

    pub fn is_playing(&self) -> bool {
        critical_section::with(|cs| self.channel.borrow_ref(cs).is_armed())
    }

    pub fn state(&self) -> GeneratorState {
        if self.is_playing() {
            GeneratorState::Armed
        } else {
            GeneratorState::Idle
        }
    }

    pub fn status(&self) -> ChannelStatus {
        critical_section::with(|cs| self.channel.borrow_ref(cs).status())
    }

    /// Run `f` against the timer backend inside the critical section
    pub fn with_timer<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        critical_section::with(|cs| f(&mut self.channel.borrow_ref_mut(cs).timer))
    }

    /// Compare-match handler; call from the channel's interrupt vector.
    pub fn on_compare_match(&self) {
        critical_section::with(|cs| self.channel.borrow_ref_mut(cs).on_signal_match());
    }
}

impl<T: TimerController> CompareMatch for SignalGenerator<T> {
    fn on_compare_match(&self) {
        SignalGenerator::on_compare_match(self)
    }

    fn is_playing(&self) -> bool {
        SignalGenerator::is_playing(self)
    }
}
