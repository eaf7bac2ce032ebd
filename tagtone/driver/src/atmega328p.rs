//! ATmega328P register backend
//!
//! Timer/counter 1 (16-bit) and timer/counter 2 (8-bit) in CTC mode with the
//! output-compare-A interrupt. Port pins are toggled by writing the port
//! output register directly, never through the timer's own compare output.

#![allow(unsafe_code)]

use tagtone_core::{Prescaler, TimerChannel};

use crate::gpio::OutputPin;
use crate::timer::TimerController;

const TIMSK1: usize = 0x6F;
const TIMSK2: usize = 0x70;
const TCCR1A: usize = 0x80;
const TCCR1B: usize = 0x81;
const OCR1AL: usize = 0x88;
const OCR1AH: usize = 0x89;
const TCCR2A: usize = 0xB0;
const TCCR2B: usize = 0xB1;
const OCR2A: usize = 0xB3;

/// `OCIEnA` bit in both `TIMSKn` registers
const OCIE_A: u8 = 1 << 1;
/// `WGM12` in `TCCR1B`
const WGM12: u8 = 1 << 3;
/// `WGM21` in `TCCR2A`
const WGM21: u8 = 1 << 1;
const CLOCK_SELECT_MASK: u8 = 0b111;

#[inline(always)]
fn read(addr: usize) -> u8 {
    // SAFETY: every address passed here is a memory-mapped I/O register of
    // the ATmega328P, valid for byte reads at any time.
    unsafe { core::ptr::read_volatile(addr as *const u8) }
}

#[inline(always)]
fn write(addr: usize, value: u8) {
    // SAFETY: as for `read`; the registers written here belong to the timer
    // channel or output port this controller owns.
    unsafe { core::ptr::write_volatile(addr as *mut u8, value) }
}

#[derive(Debug, Clone, Copy)]
struct Registers {
    tccr_a: usize,
    tccr_b: usize,
    ocr_low: usize,
    /// High byte of a 16-bit compare register, written first
    ocr_high: Option<usize>,
    timsk: usize,
    /// Register and bit that select CTC mode
    wgm: (usize, u8),
}

/// One of the two compare-match timers of an ATmega328P
#[derive(Debug)]
pub struct Atmega328Timer {
    channel: TimerChannel,
    regs: Registers,
}

impl Atmega328Timer {
    /// Timer/counter 1, the 16-bit signal channel
    pub const fn timer1() -> Self {
        Self {
            channel: TimerChannel::Channel1,
            regs: Registers {
                tccr_a: TCCR1A,
                tccr_b: TCCR1B,
                ocr_low: OCR1AL,
                ocr_high: Some(OCR1AH),
                timsk: TIMSK1,
                wgm: (TCCR1B, WGM12),
            },
        }
    }

    /// Timer/counter 2, the 8-bit carrier channel
    pub const fn timer2() -> Self {
        Self {
            channel: TimerChannel::Channel2,
            regs: Registers {
                tccr_a: TCCR2A,
                tccr_b: TCCR2B,
                ocr_low: OCR2A,
                ocr_high: None,
                timsk: TIMSK2,
                wgm: (TCCR2A, WGM21),
            },
        }
    }
}

impl TimerController for Atmega328Timer {
    fn channel(&self) -> TimerChannel {
        self.channel
    }

    fn configure_ctc(&mut self) {
        write(self.regs.tccr_a, 0);
        write(self.regs.tccr_b, 0);
        let (reg, bit) = self.regs.wgm;
        write(reg, read(reg) | bit);
    }

    fn set_prescaler(&mut self, prescaler: Prescaler) {
        let bits = self.channel.clock_select(prescaler).unwrap_or(0);
        let tccr_b = read(self.regs.tccr_b);
        write(self.regs.tccr_b, (tccr_b & !CLOCK_SELECT_MASK) | bits);
    }

    fn set_compare_value(&mut self, value: u16) {
        let [high, low] = value.to_be_bytes();
        match self.regs.ocr_high {
            Some(ocr_high) => {
                write(ocr_high, high);
                write(self.regs.ocr_low, low);
            }
            None => write(self.regs.ocr_low, low),
        }
    }

    fn enable_interrupt(&mut self) {
        write(self.regs.timsk, read(self.regs.timsk) | OCIE_A);
    }

    fn disable_interrupt(&mut self) {
        write(self.regs.timsk, read(self.regs.timsk) & !OCIE_A);
    }

    fn is_interrupt_enabled(&self) -> bool {
        read(self.regs.timsk) & OCIE_A != 0
    }

    fn toggle_pin(&mut self, pin: OutputPin) {
        write(pin.port.0, read(pin.port.0) ^ pin.mask);
    }

    fn set_pin_low(&mut self, pin: OutputPin) {
        write(pin.port.0, read(pin.port.0) & !pin.mask);
    }
}
