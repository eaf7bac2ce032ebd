//! # TagTone
//!
//! Modulated infrared pulse generator for laser-tag devices.
//!
//! Two hardware timers do all the work. The 8-bit timer toggles the output
//! pin at the 57.6 kHz carrier and gates it on and off at the 1.8 kHz signal
//! rate for a fixed 50 ms burst; the 16-bit timer produces the bare 1.8 kHz
//! signal for a caller-chosen duration. After `play` returns, every edge is
//! produced from the timer's compare-match interrupt.
//!
//! Hardware is reached through [`TimerController`], so the state machines run
//! unchanged against the [`sim::SimTimer`] backend on a host.
//!
//! ```
//! use tagtone::sim::SimTimer;
//! use tagtone::{CarrierGenerator, PulseDriver, SignalGenerator, UnoPins};
//! use tagtone_core::{PulseConfig, TimerChannel};
//!
//! static CARRIER: CarrierGenerator<SimTimer> =
//!     CarrierGenerator::new(SimTimer::new(TimerChannel::Channel2), PulseConfig::DEFAULT);
//! static SIGNAL: SignalGenerator<SimTimer> =
//!     SignalGenerator::new(SimTimer::new(TimerChannel::Channel1), PulseConfig::DEFAULT);
//!
//! let mut driver = PulseDriver::new(UnoPins, &CARRIER, &SIGNAL);
//! driver.begin_carrier(3).unwrap();
//! driver.play_carrier().unwrap();
//! assert!(driver.is_playing());
//!
//! // The interrupt vector forwards to the generator.
//! CARRIER.on_compare_match();
//!
//! driver.stop();
//! assert!(!driver.is_playing());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod carrier;
pub mod channel;
pub mod driver;
pub mod error;
pub mod gpio;
pub mod signal;
pub mod sim;
pub mod timer;

#[cfg(feature = "atmega328p")]
pub mod atmega328p;

pub use carrier::{CarrierGenerator, CarrierStatus};
pub use channel::{ChannelStatus, GeneratorState};
pub use driver::PulseDriver;
pub use error::{HalError, HalResult};
pub use gpio::{OutputPin, PinResolver, PortAddress, UnoPins};
pub use signal::SignalGenerator;
pub use timer::{CompareMatch, TimerController};

pub use tagtone_core::{PlayDuration, PulseConfig, TimerChannel, ToggleBudget};
