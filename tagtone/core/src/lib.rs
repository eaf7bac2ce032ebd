#![no_std]
#![forbid(unsafe_code)]

//! # TagTone Core
//!
//! Pure timer arithmetic for the laser-tag pulse generator: channel and
//! prescaler descriptions, compare-value and toggle-count derivation, the
//! signed toggle budget, and the build-time pulse configuration.
//!
//! Nothing in this crate touches hardware. The driver crate feeds the values
//! computed here into a timer backend.

#[cfg(feature = "std")]
extern crate std;

pub mod budget;
pub mod channel;
pub mod config;
pub mod frequency;

pub use budget::*;
pub use channel::*;
pub use config::*;
pub use frequency::*;


/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Carrier frequency of the infrared burst.
pub const CARRIER_FREQUENCY_HZ: u32 = 57_600;

/// Frequency of the signal that gates the carrier on and off.
pub const SIGNAL_FREQUENCY_HZ: u32 = 1_800;

/// Length of one carrier burst.
pub const CARRIER_BURST_MS: u32 = 50;

/// CPU clock of the reference board (ATmega328P at 16 MHz).
pub const DEFAULT_CPU_CLOCK_HZ: u32 = 16_000_000;
