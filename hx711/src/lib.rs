//! Bit-bang driver for the HX711 24 bit load cell ADC.
//!
//! The chip signals a finished conversion by pulling its data line
//! low.  Reading is a synchronous clock burst: one data bit per pulse,
//! MSB first, for 24 pulses.  Extra pulses beyond 24 carry no data;
//! their count selects gain and input channel of the *next*
//! conversion.  That mapping is a property of the chip and is not
//! configurable here.
//!
//! The clock burst is timing critical: a stretched high phase makes
//! the chip power down mid-read.  [Hx711::read] therefore runs the
//! whole burst inside one interrupt-off critical section provided by
//! the I/O capability.

#![no_std]

use avr_int24::Int24;

/// Number of data bits per conversion.
pub const DATA_BITS: u8 = 24;

/// Gain and input channel of the next conversion, selected by the
/// clock pulse count of a read.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Gain {
    /// Channel A, gain 128.
    ChanA128,
    /// Channel B, gain 32.
    ChanB32,
}

impl Gain {
    /// Total clock pulses that select this gain.
    pub const fn clock_pulses(self) -> u8 {
        match self {
            Gain::ChanA128 => 25,
            Gain::ChanB32 => 26,
        }
    }
}

/// Pin access and the interrupt-off capability of the driver.
pub trait Hx711Io {
    /// Drive the PD_SCK clock line.
    fn set_sck(&mut self, level: bool);

    /// Sample the DOUT data line.
    fn read_dout(&mut self) -> bool;

    /// Run `f` with interrupts disabled.
    ///
    /// The window is bounded: at most [Gain::clock_pulses] pulses of a
    /// few cycles each, with no data dependent branching inside.
    fn critical<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R;
}

pub struct Hx711<IO> {
    io: IO,
}

impl<IO: Hx711Io> Hx711<IO> {
    pub const fn new(io: IO) -> Self {
        Self { io }
    }

    /// Check for a finished conversion.  Ready is DOUT low.
    #[inline]
    pub fn is_ready(&mut self) -> bool {
        !self.io.read_dout()
    }

    /// Clock in one conversion, sign-extended from bit 23.
    ///
    /// `gain` selects the pulse count and thereby the gain and channel
    /// of the *following* conversion; the value returned here still
    /// comes from the previously selected setting.
    ///
    /// The caller must have observed [Hx711::is_ready].  Reading an
    /// unfinished conversion is a precondition violation; the hot path
    /// carries no guard for it.
    pub fn read(&mut self, gain: Gain) -> Int24 {
        let pulses = gain.clock_pulses();

        let raw = self.io.critical(|io| {
            let mut raw: u32 = 0;
            for _ in 0..pulses {
                io.set_sck(true);
                let bit = io.read_dout();
                io.set_sck(false);
                raw = (raw << 1) | bit as u32;
            }
            raw
        });

        // Data is only present on the first DATA_BITS pulses.  The
        // gain selection tail clocks in ones.
        let raw = raw >> (pulses - DATA_BITS);
        Int24::from_i32(((raw << 8) as i32) >> 8)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Chip model: serves the latched conversion bit by bit, latches
    /// the channel for the next conversion from the pulse count, and
    /// records critical section coverage.
    struct MockIo {
        chan_a: i32,
        chan_b: i32,
        current: i32,
        sck: bool,
        pulses: u8,
        in_critical: bool,
        uncovered_pulses: u8,
    }

    impl MockIo {
        fn new(chan_a: i32, chan_b: i32) -> Self {
            Self {
                chan_a,
                chan_b,
                // Power-up default of the chip is channel A, gain 128.
                current: chan_a,
                sck: false,
                pulses: 0,
                in_critical: false,
                uncovered_pulses: 0,
            }
        }
    }

    impl Hx711Io for MockIo {
        fn set_sck(&mut self, level: bool) {
            if level && !self.sck {
                self.pulses += 1;
                if !self.in_critical {
                    self.uncovered_pulses += 1;
                }
            }
            self.sck = level;
        }

        fn read_dout(&mut self) -> bool {
            if self.pulses == 0 {
                // Between reads: conversion ready, DOUT low.
                return false;
            }
            let idx = self.pulses - 1;
            if idx < DATA_BITS {
                (self.current >> (DATA_BITS - 1 - idx)) & 1 != 0
            } else {
                // Gain selection tail: DOUT rides high.
                true
            }
        }

        fn critical<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
            self.in_critical = true;
            let ret = f(self);
            self.in_critical = false;

            // End of burst: latch the next conversion per pulse count.
            self.current = match self.pulses {
                25 => self.chan_a,
                26 => self.chan_b,
                n => panic!("invalid pulse count {n}"),
            };
            self.pulses = 0;
            ret
        }
    }

    #[test]
    fn test_ready_is_dout_low() {
        let mut hx = Hx711::new(MockIo::new(0, 0));
        assert!(hx.is_ready());
        // Mid-conversion with the MSB set, DOUT reads high.
        hx.io.pulses = 1;
        hx.io.current = i32::MIN >> 8;
        assert!(!hx.is_ready());
    }

    #[test]
    fn test_read_sign_extends() {
        for v in [0, 42, -1, 0x7F_FFFF, -0x80_0000, -4242] {
            let mut hx = Hx711::new(MockIo::new(v, 0));
            assert_eq!(hx.read(Gain::ChanA128).to_i32(), v);
        }
    }

    #[test]
    fn test_gain_selects_next_conversion() {
        let mut hx = Hx711::new(MockIo::new(1111, 2222));

        // Power-up: first read returns channel A.  The 26 pulse read
        // also still returns channel A (one conversion lag); only the
        // read after it sees channel B.
        assert_eq!(hx.read(Gain::ChanA128).to_i32(), 1111);
        assert_eq!(hx.read(Gain::ChanB32).to_i32(), 1111);
        assert_eq!(hx.read(Gain::ChanA128).to_i32(), 2222);
        assert_eq!(hx.read(Gain::ChanA128).to_i32(), 1111);
    }

    #[test]
    fn test_burst_is_fully_covered_by_critical_section() {
        let mut hx = Hx711::new(MockIo::new(5, 5));
        let _ = hx.read(Gain::ChanA128);
        let _ = hx.read(Gain::ChanB32);
        assert_eq!(hx.io.uncovered_pulses, 0);
        // Clock must rest low, otherwise the chip powers down.
        assert!(!hx.io.sck);
    }

    #[test]
    fn test_pulse_counts() {
        assert_eq!(Gain::ChanA128.clock_pulses(), 25);
        assert_eq!(Gain::ChanB32.clock_pulses(), 26);
    }
}

// vim: ts=4 sw=4 expandtab
