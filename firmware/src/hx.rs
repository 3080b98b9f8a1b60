//! Load cell ADC wiring.

use crate::{hw::interrupt, ports::PORTB};
use hx711::{Hx711, Hx711Io};

/// PB0 clocks the ADC.
const SCK_BIT: usize = 0;
/// PB2 is the ADC data output.
const DOUT_BIT: usize = 2;

/// Direct register access to the ADC pins.
pub struct HwHxIo;

impl Hx711Io for HwHxIo {
    #[inline(always)]
    fn set_sck(&mut self, level: bool) {
        PORTB.set(SCK_BIT, level);
    }

    #[inline(always)]
    fn read_dout(&mut self) -> bool {
        PORTB.get(DOUT_BIT)
    }

    fn critical<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        // The readout burst takes well under a millisecond at our
        // clock.  Bus frames addressed to us during that window are
        // lost and the requester retries.
        interrupt::free(|_| f(self))
    }
}

pub fn hx_init() -> Hx711<HwHxIo> {
    Hx711::new(HwHxIo)
}

// vim: ts=4 sw=4 expandtab
