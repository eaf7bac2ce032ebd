//! Public pulse API
//!
//! [`PulseDriver`] is the object application code holds. It resolves pins,
//! remembers which channel it last started, and routes `stop` and
//! `is_playing` to that channel.

use log::debug;
use tagtone_core::{PlayDuration, TimerChannel};

use crate::carrier::CarrierGenerator;
use crate::error::HalResult;
use crate::gpio::PinResolver;
use crate::signal::SignalGenerator;
use crate::timer::TimerController;

pub struct PulseDriver<'a, R, C, S> {
    resolver: R,
    carrier: &'a CarrierGenerator<C>,
    signal: &'a SignalGenerator<S>,
    channel: Option<TimerChannel>,
    pin: Option<u8>,
}

impl<'a, R, C, S> PulseDriver<'a, R, C, S>
where
    R: PinResolver,
    C: TimerController,
    S: TimerController,
{
    pub fn new(
        resolver: R,
        carrier: &'a CarrierGenerator<C>,
        signal: &'a SignalGenerator<S>,
    ) -> Self {
        Self {
            resolver,
            carrier,
            signal,
            channel: None,
            pin: None,
        }
    }

    /// Bind the carrier generator to `pin`
    pub fn begin_carrier(&mut self, pin: u8) -> HalResult<()> {
        let output = self.resolver.resolve(pin)?;
        self.carrier.configure(output);
        self.bind(self.carrier.channel(), pin);
        Ok(())
    }

    /// Bind the signal generator to `pin`
    pub fn begin_signal(&mut self, pin: u8) -> HalResult<()> {
        let output = self.resolver.resolve(pin)?;
        self.signal.configure(output);
        self.bind(self.signal.channel(), pin);
        Ok(())
    }

    /// Fire one 50 ms gated carrier burst
    pub fn play_carrier(&mut self) -> HalResult<()> {
        self.carrier.play()?;
        self.channel = Some(self.carrier.channel());
        Ok(())
    }

    /// Play the bare signal for `duration_ms` milliseconds
    pub fn play_signal(&mut self, duration_ms: u32) -> HalResult<()> {
        self.play_signal_for(PlayDuration::Millis(duration_ms))
    }

    pub fn play_signal_for(&mut self, duration: PlayDuration) -> HalResult<()> {
        self.signal.play_for(duration)?;
        self.channel = Some(self.signal.channel());
        Ok(())
    }

    /// Stop the bound channel and leave its pin low. No-op when unbound.
    pub fn stop(&mut self) {
        match self.channel {
            Some(channel) if channel == self.carrier.channel() => self.carrier.stop(),
            Some(channel) if channel == self.signal.channel() => self.signal.stop(),
            _ => {}
        }
    }

    pub fn is_playing(&self) -> bool {
        match self.channel {
            Some(channel) if channel == self.carrier.channel() => self.carrier.is_playing(),
            Some(channel) if channel == self.signal.channel() => self.signal.is_playing(),
            _ => false,
        }
    }

    /// Channel `stop` and `is_playing` currently act on
    pub fn channel(&self) -> Option<TimerChannel> {
        self.channel
    }

    /// Logical pin passed to the last `begin_*`
    pub fn pin(&self) -> Option<u8> {
        self.pin
    }

    fn bind(&mut self, channel: TimerChannel, pin: u8) {
        debug!("pin {} bound to {}", pin, channel);
        self.channel = Some(channel);
        self.pin = Some(pin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HalError;
    use crate::gpio::UnoPins;
    use crate::sim::SimTimer;
    use tagtone_core::PulseConfig;

    fn generators() -> (CarrierGenerator<SimTimer>, SignalGenerator<SimTimer>) {
        (
            CarrierGenerator::new(SimTimer::new(TimerChannel::Channel2), PulseConfig::DEFAULT),
            SignalGenerator::new(SimTimer::new(TimerChannel::Channel1), PulseConfig::DEFAULT),
        )
    }

    #[test]
    fn test_unbound_driver_is_inert() {
        let (carrier, signal) = generators();
        let mut driver = PulseDriver::new(UnoPins, &carrier, &signal);
        assert_eq!(driver.channel(), None);
        assert!(!driver.is_playing());
        driver.stop();
        assert!(!driver.is_playing());
    }

    #[test]
    fn test_begin_binds_channel() {
        let (carrier, signal) = generators();
        let mut driver = PulseDriver::new(UnoPins, &carrier, &signal);

        driver.begin_carrier(3).unwrap();
        assert_eq!(driver.channel(), Some(TimerChannel::Channel2));
        assert_eq!(driver.pin(), Some(3));

        driver.begin_signal(9).unwrap();
        assert_eq!(driver.channel(), Some(TimerChannel::Channel1));
        assert_eq!(driver.pin(), Some(9));
    }

    #[test]
    fn test_begin_rejects_invalid_pin() {
        let (carrier, signal) = generators();
        let mut driver = PulseDriver::new(UnoPins, &carrier, &signal);
        assert_eq!(driver.begin_carrier(42), Err(HalError::InvalidPin(42)));
        assert_eq!(driver.channel(), None);
        assert_eq!(driver.play_carrier(), Err(HalError::NotConfigured));
    }

    #[test]
    fn test_stop_targets_last_started_channel() {
        let (carrier, signal) = generators();
        let mut driver = PulseDriver::new(UnoPins, &carrier, &signal);
        driver.begin_carrier(3).unwrap();
        driver.begin_signal(9).unwrap();

        driver.play_carrier().unwrap();
        driver.play_signal(100).unwrap();
        assert_eq!(driver.channel(), Some(TimerChannel::Channel1));

        driver.stop();
        assert!(!signal.is_playing());
        assert!(carrier.is_playing());

        driver.play_carrier().unwrap();
        driver.stop();
        assert!(!carrier.is_playing());
    }
}
