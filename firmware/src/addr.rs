//! Node address from the resistive divider on PB4.
//!
//! Each node carries a fixed divider that maps its address to a
//! distinct voltage band.  Sampled once at boot, before the bus
//! decoder starts.

use crate::hw::mcu;
use owbus::timing::MAX_ADDRESS;

/// Upper 10 bit ADC reading of each address band, Vcc referenced.
/// A reading strictly below `CUTOFF_MARKS[i]` selects address `i`.
const CUTOFF_MARKS: [u16; 10] = [51, 153, 245, 350, 456, 570, 670, 782, 870, 985];

#[rustfmt::skip]
fn convert(adc: &mcu::ADC) -> u16 {
    adc.adcsra().modify(|_, w| {
        w.adif().set_bit()
         .adsc().set_bit()
    });
    while adc.adcsra().read().adif().bit_is_clear() {}
    adc.adc().read().bits()
}

/// Sample the divider and derive the bus address.
#[rustfmt::skip]
pub fn read_address(adc: &mcu::ADC) -> u8 {
    // Vcc reference, single ended channel 2 (PB4).
    // SAFETY: Raw mux value for ADC2.
    adc.admux().write(|w| unsafe { w.bits(0x02) });
    adc.adcsra().write(|w| {
        w.adps().prescaler_128()
         .adie().clear_bit()
         .adif().set_bit()
         .adsc().clear_bit()
         .aden().set_bit()
    });

    // First conversion after enabling is an extended dummy one.
    let _ = convert(adc);
    let reading = convert(adc);

    adc.adcsra().modify(|_, w| w.aden().clear_bit());

    // Readings at or above the last cutoff map to the last address.
    let mut address = CUTOFF_MARKS.len() as u8 - 1;
    for (i, cutoff) in CUTOFF_MARKS.iter().enumerate() {
        if reading < *cutoff {
            address = i as u8;
            break;
        }
    }
    address & MAX_ADDRESS
}

// vim: ts=4 sw=4 expandtab
