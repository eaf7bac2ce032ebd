//! Hardware timer channels, counter widths and prescalers

use core::fmt;

/// Counter width of a hardware timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerWidth {
    /// 8-bit counter
    Bits8,
    /// 16-bit counter
    Bits16,
}

impl TimerWidth {
    /// Largest value the compare register can hold
    pub const fn max_compare(self) -> u32 {
        match self {
            Self::Bits8 => u8::MAX as u32,
            Self::Bits16 => u16::MAX as u32,
        }
    }

    /// Number of counter bits
    pub const fn bits(self) -> u8 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
        }
    }
}

impl fmt::Display for TimerWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerWidth {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}-bit", self.bits());
    }
}

/// Clock divider between the CPU clock and the timer counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Prescaler {
    Div1,
    Div8,
    Div32,
    Div64,
    Div128,
    Div256,
    Div1024,
}

impl Prescaler {
    /// Division factor applied to the CPU clock
    pub const fn divisor(self) -> u32 {
        match self {
            Self::Div1 => 1,
            Self::Div8 => 8,
            Self::Div32 => 32,
            Self::Div64 => 64,
            Self::Div128 => 128,
            Self::Div256 => 256,
            Self::Div1024 => 1024,
        }
    }
}

impl fmt::Display for Prescaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clk/{}", self.divisor())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Prescaler {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "clk/{}", self.divisor());
    }
}

const CHANNEL1_PRESCALERS: [Prescaler; 5] = [
    Prescaler::Div1,
    Prescaler::Div8,
    Prescaler::Div64,
    Prescaler::Div256,
    Prescaler::Div1024,
];

const CHANNEL2_PRESCALERS: [Prescaler; 7] = [
    Prescaler::Div1,
    Prescaler::Div8,
    Prescaler::Div32,
    Prescaler::Div64,
    Prescaler::Div128,
    Prescaler::Div256,
    Prescaler::Div1024,
];

/// Hardware timer a generator is bound to.
///
/// Channel 1 is the 16-bit timer that carries the bare signal, channel 2 is
/// the 8-bit timer that carries the gated carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerChannel {
    Channel1,
    Channel2,
}

impl TimerChannel {
    /// Channel number as printed on the datasheet
    pub const fn number(self) -> u8 {
        match self {
            Self::Channel1 => 1,
            Self::Channel2 => 2,
        }
    }

    /// Counter width of the channel
    pub const fn width(self) -> TimerWidth {
        match self {
            Self::Channel1 => TimerWidth::Bits16,
            Self::Channel2 => TimerWidth::Bits8,
        }
    }

    /// Prescalers the channel supports, smallest first
    pub fn prescalers(self) -> &'static [Prescaler] {
        match self {
            Self::Channel1 => &CHANNEL1_PRESCALERS,
            Self::Channel2 => &CHANNEL2_PRESCALERS,
        }
    }

    /// Value of the 3-bit clock-select field for `prescaler`, if supported
    pub fn clock_select(self, prescaler: Prescaler) -> Option<u8> {
        self.prescalers()
            .iter()
            .position(|p| *p == prescaler)
            .map(|index| index as u8 + 1)
    }
}

impl fmt::Display for TimerChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer{}", self.number())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerChannel {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "timer{}", self.number());
    }
}
