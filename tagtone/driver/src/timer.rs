//! Timer and compare-match interrupt abstraction

use tagtone_core::{Prescaler, TimerChannel};

use crate::gpio::OutputPin;

/// One hardware timer channel together with the output port it toggles.
///
/// Every method is called either from normal-priority code inside a critical
/// section or from the channel's own compare-match handler, so
/// implementations need no locking of their own. None of them may block:
/// `toggle_pin` and `set_pin_low` run at interrupt priority on every match.
pub trait TimerController {
    /// Channel this controller drives
    fn channel(&self) -> TimerChannel;

    /// Clear-timer-on-compare mode with the clock stopped
    fn configure_ctc(&mut self);

    /// Start the counter clock through `prescaler`
    fn set_prescaler(&mut self, prescaler: Prescaler);

    /// Write the compare-match register
    fn set_compare_value(&mut self, value: u16);

    /// Unmask the compare-match interrupt
    fn enable_interrupt(&mut self);

    /// Mask the compare-match interrupt
    fn disable_interrupt(&mut self);

    /// Whether the compare-match interrupt is unmasked
    fn is_interrupt_enabled(&self) -> bool;

    /// Invert the pin's output bit
    fn toggle_pin(&mut self, pin: OutputPin);

    /// Clear the pin's output bit
    fn set_pin_low(&mut self, pin: OutputPin);
}

/// Entry point an interrupt vector forwards to.
pub trait CompareMatch {
    /// Handle one compare-match event. Constant time.
    fn on_compare_match(&self);

    /// Whether the channel's interrupt is still enabled
    fn is_playing(&self) -> bool;
}

impl<C: CompareMatch + ?Sized> CompareMatch for &C {
    fn on_compare_match(&self) {
        (**self).on_compare_match()
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }
}
