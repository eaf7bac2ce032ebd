//! Build-time pulse configuration

use core::fmt;

use crate::channel::{Prescaler, TimerChannel};
use crate::frequency::{FrequencyProgrammer, ProgramError, TimerProgram};
use crate::{CARRIER_BURST_MS, CARRIER_FREQUENCY_HZ, DEFAULT_CPU_CLOCK_HZ, SIGNAL_FREQUENCY_HZ};

/// Channel the carrier generator drives
pub const CARRIER_CHANNEL: TimerChannel = TimerChannel::Channel2;

/// Channel the signal generator drives
pub const SIGNAL_CHANNEL: TimerChannel = TimerChannel::Channel1;

/// Problems found by [`PulseConfig::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Carrier frequency cannot be programmed with the chosen prescaler
    Carrier(ProgramError),
    /// Signal frequency cannot be programmed with the chosen prescaler
    Signal(ProgramError),
    /// Prescaler not offered by the channel
    UnsupportedPrescaler {
        channel: TimerChannel,
        prescaler: Prescaler,
    },
    /// Carrier burst of zero milliseconds
    ZeroDuration,
    /// Signal faster than the carrier, or 0 Hz, so the gate never flips
    GateCycleZero,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Carrier(err) => write!(f, "carrier: {}", err),
            Self::Signal(err) => write!(f, "signal: {}", err),
            Self::UnsupportedPrescaler { channel, prescaler } => {
                write!(f, "{} does not support {}", channel, prescaler)
            }
            Self::ZeroDuration => write!(f, "carrier burst duration is zero"),
            Self::GateCycleZero => write!(f, "signal frequency must be nonzero and not above the carrier"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Carrier(err) | Self::Signal(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Carrier(err) => defmt::write!(fmt, "Carrier({})", err),
            Self::Signal(err) => defmt::write!(fmt, "Signal({})", err),
            Self::UnsupportedPrescaler { channel, prescaler } => {
                defmt::write!(fmt, "UnsupportedPrescaler({}, {})", channel, prescaler)
            }
            Self::ZeroDuration => defmt::write!(fmt, "ZeroDuration"),
            Self::GateCycleZero => defmt::write!(fmt, "GateCycleZero"),
        }
    }
}

/// Frequencies, clock and prescalers the generators are built with.
///
/// The prescalers are fixed rather than searched for: at 16 MHz `clk/1`
/// fits both channels. A board with a different clock must pick new ones,
/// and [`PulseConfig::validate`] reports when the pick no longer fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseConfig {
    pub cpu_clock_hz: u32,
    pub carrier_hz: u32,
    pub signal_hz: u32,
    pub burst_ms: u32,
    pub carrier_prescaler: Prescaler,
    pub signal_prescaler: Prescaler,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl PulseConfig {
    /// Shipped laser-tag pulse on a 16 MHz board
    pub const DEFAULT: Self = Self {
        cpu_clock_hz: DEFAULT_CPU_CLOCK_HZ,
        carrier_hz: CARRIER_FREQUENCY_HZ,
        signal_hz: SIGNAL_FREQUENCY_HZ,
        burst_ms: CARRIER_BURST_MS,
        carrier_prescaler: Prescaler::Div1,
        signal_prescaler: Prescaler::Div1,
    };

    /// Creates a new configuration builder.
    pub fn builder() -> PulseConfigBuilder {
        PulseConfigBuilder::default()
    }

    pub const fn programmer(&self) -> FrequencyProgrammer {
        FrequencyProgrammer::new(self.cpu_clock_hz)
    }

    /// Carrier program with the configured prescaler
    pub fn carrier_program(&self) -> TimerProgram {
        self.programmer()
            .program(self.carrier_hz, self.carrier_prescaler, CARRIER_CHANNEL.width())
    }

    /// Signal program with the configured prescaler
    pub fn signal_program(&self) -> TimerProgram {
        self.programmer()
            .program(self.signal_hz, self.signal_prescaler, SIGNAL_CHANNEL.width())
    }

    /// Carrier toggles in one burst
    pub fn carrier_toggle_count(&self) -> i32 {
        FrequencyProgrammer::toggle_count(self.carrier_hz, self.burst_ms)
    }

    /// Carrier toggles between two flips of the gating signal
    pub fn gate_cycle(&self) -> u32 {
        FrequencyProgrammer::gate_cycle(self.carrier_hz, self.signal_hz)
    }

    /// Checks that every derived register value is representable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (channel, prescaler) in [
            (CARRIER_CHANNEL, self.carrier_prescaler),
            (SIGNAL_CHANNEL, self.signal_prescaler),
        ] {
            if channel.clock_select(prescaler).is_none() {
                return Err(ConfigError::UnsupportedPrescaler { channel, prescaler });
            }
        }

        let programmer = self.programmer();
        programmer
            .check(self.carrier_hz, self.carrier_prescaler, CARRIER_CHANNEL.width())
            .map_err(ConfigError::Carrier)?;
        programmer
            .check(self.signal_hz, self.signal_prescaler, SIGNAL_CHANNEL.width())
            .map_err(ConfigError::Signal)?;

        if self.burst_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.gate_cycle() == 0 {
            return Err(ConfigError::GateCycleZero);
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PulseConfig {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "PulseConfig{{clk: {}Hz, carrier: {}Hz, signal: {}Hz, burst: {}ms}}",
            self.cpu_clock_hz,
            self.carrier_hz,
            self.signal_hz,
            self.burst_ms
        );
    }
}

/// Builder for [`PulseConfig`].
#[derive(Debug, Clone, Default)]
pub struct PulseConfigBuilder {
    config: PulseConfig,
}

impl PulseConfigBuilder {
    /// Sets the CPU clock feeding both timers.
    pub fn cpu_clock_hz(mut self, hz: u32) -> Self {
        self.config.cpu_clock_hz = hz;
        self
    }

    /// Sets the carrier frequency.
    pub fn carrier_hz(mut self, hz: u32) -> Self {
        self.config.carrier_hz = hz;
        self
    }

    /// Sets the gating signal frequency.
    pub fn signal_hz(mut self, hz: u32) -> Self {
        self.config.signal_hz = hz;
        self
    }

    /// Sets the carrier burst length.
    pub fn burst_ms(mut self, ms: u32) -> Self {
        self.config.burst_ms = ms;
        self
    }

    /// Sets the prescalers for the carrier and signal timers.
    pub fn prescalers(mut self, carrier: Prescaler, signal: Prescaler) -> Self {
        self.config.carrier_prescaler = carrier;
        self.config.signal_prescaler = signal;
        self
    }

    /// Picks the smallest fitting prescaler for both channels.
    ///
    /// Channels with no fitting prescaler keep their current one, so
    /// [`PulseConfig::validate`] still reports them.
    pub fn auto_prescalers(mut self) -> Self {
        let programmer = self.config.programmer();
        if let Ok(program) = programmer.select(self.config.carrier_hz, CARRIER_CHANNEL) {
            self.config.carrier_prescaler = program.prescaler;
        }
        if let Ok(program) = programmer.select(self.config.signal_hz, SIGNAL_CHANNEL) {
            self.config.signal_prescaler = program.prescaler;
        }
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> PulseConfig {
        self.config
    }
}
