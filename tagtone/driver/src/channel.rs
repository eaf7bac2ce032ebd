//! Per-channel state shared between the API and the interrupt handler

use tagtone_core::{Prescaler, TimerChannel, TimerProgram, ToggleBudget};

use crate::gpio::OutputPin;
use crate::timer::TimerController;

/// Whether a generator is currently producing edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Idle,
    Armed,
}

#[cfg(feature = "defmt")]
impl defmt::Format for GeneratorState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(fmt, "Idle"),
            Self::Armed => defmt::write!(fmt, "Armed"),
        }
    }
}

/// Snapshot of a channel taken inside a critical section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStatus {
    pub channel: TimerChannel,
    pub state: GeneratorState,
    pub pin: Option<OutputPin>,
    pub program: TimerProgram,
    pub budget: ToggleBudget,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChannelStatus {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{}: {} {} {}",
            self.channel,
            self.state,
            self.program,
            self.budget
        );
    }
}

pub(crate) const UNPROGRAMMED: TimerProgram = TimerProgram {
    prescaler: Prescaler::Div1,
    compare: 0,
};

/// Timer, pin binding and toggle budget of one channel.
///
/// Lives inside a `critical_section::Mutex`; every method assumes the caller
/// holds the section.
pub(crate) struct ChannelCore<T> {
    pub(crate) timer: T,
    pub(crate) pin: Option<OutputPin>,
    pub(crate) program: TimerProgram,
    pub(crate) budget: ToggleBudget,
}

impl<T: TimerController> ChannelCore<T> {
    pub(crate) const fn new(timer: T) -> Self {
        Self {
            timer,
            pin: None,
            program: UNPROGRAMMED,
            budget: ToggleBudget::IDLE,
        }
    }

    /// Bind the pin and put the timer in CTC mode at the program's prescaler
    pub(crate) fn configure(&mut self, pin: OutputPin, program: TimerProgram) {
        self.pin = Some(pin);
        self.program = program;
        self.timer.configure_ctc();
        self.timer.set_prescaler(program.prescaler);
    }

    /// Load the compare register and budget, then unmask the interrupt
    pub(crate) fn arm(&mut self, budget: ToggleBudget) {
        self.timer.set_compare_value(self.program.compare);
        self.budget = budget;
        self.timer.enable_interrupt();
    }

    /// Mask the interrupt and drive the pin low
    pub(crate) fn halt(&mut self) {
        self.timer.disable_interrupt();
        if let Some(pin) = self.pin {
            self.timer.set_pin_low(pin);
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.timer.is_interrupt_enabled()
    }

    pub(crate) fn status(&self) -> ChannelStatus {
        ChannelStatus {
            channel: self.timer.channel(),
            state: if self.is_armed() {
                GeneratorState::Armed
            } else {
                GeneratorState::Idle
            },
            pin: self.pin,
            program: self.program,
            budget: self.budget,
        }
    }
}
