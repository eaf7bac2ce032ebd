//! Output pin resolution
//!
//! A logical pin number is turned into a port register address and bit mask
//! once, when a generator is configured. The interrupt handlers only ever
//! see the resolved [`OutputPin`].

use core::fmt;

use crate::error::{HalError, HalResult};

/// Data-space address of a port output register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortAddress(pub usize);

/// Output register address and bit mask of one pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPin {
    pub port: PortAddress,
    pub mask: u8,
}

impl OutputPin {
    pub const fn new(port: PortAddress, mask: u8) -> Self {
        Self { port, mask }
    }

    /// Whether this pin's bit is set in a port register value
    pub const fn is_high_in(&self, port_value: u8) -> bool {
        port_value & self.mask != 0
    }
}

impl fmt::Display for OutputPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port@{:#04x} mask={:#010b}", self.port.0, self.mask)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OutputPin {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "port@{=usize:#x} mask={=u8:#b}", self.port.0, self.mask);
    }
}

/// Maps logical pin numbers to output registers
pub trait PinResolver {
    /// Resolve `pin`, or report that the board has no such output
    fn resolve(&self, pin: u8) -> HalResult<OutputPin>;
}

impl<R: PinResolver + ?Sized> PinResolver for &R {
    fn resolve(&self, pin: u8) -> HalResult<OutputPin> {
        (**self).resolve(pin)
    }
}

/// ATmega328P `PORTB`
pub const PORTB: PortAddress = PortAddress(0x25);
/// ATmega328P `PORTC`
pub const PORTC: PortAddress = PortAddress(0x28);
/// ATmega328P `PORTD`
pub const PORTD: PortAddress = PortAddress(0x2B);

/// Arduino Uno digital pin numbering.
///
/// D0–D7 sit on `PORTD`, D8–D13 on `PORTB` and A0–A5 (14–19) on `PORTC`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnoPins;

impl PinResolver for UnoPins {
    fn resolve(&self, pin: u8) -> HalResult<OutputPin> {
        match pin {
            0..=7 => Ok(OutputPin::new(PORTD, 1 << pin)),
            8..=13 => Ok(OutputPin::new(PORTB, 1 << (pin - 8))),
            14..=19 => Ok(OutputPin::new(PORTC, 1 << (pin - 14))),
            _ => Err(HalError::InvalidPin(pin)),
        }
    }
}
