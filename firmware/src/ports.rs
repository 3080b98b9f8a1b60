#![allow(unused_unsafe)]

use crate::hw::mcu;

/// Pin allocation:
///
/// - PB0: HX711 PD_SCK clock out (field) / spare, driven low (station)
/// - PB1: bus TX
/// - PB2: HX711 DOUT in, pullup (field) / debug out (station)
/// - PB3: bus RX, pin change interrupt
/// - PB4: address divider, ADC2 (field) / spare input (station)
/// - PB5: RESET
pub struct PortB;

pub static PORTB: PortB = PortB;

impl PortB {
    #[inline(always)]
    fn regs() -> &'static mcu::portb::RegisterBlock {
        // SAFETY: All accesses are single volatile register operations.
        //         Read-modify-writes of PORTB only happen from the edge
        //         ISR or inside interrupt-disabled sections, so they
        //         cannot interleave.
        unsafe { &*mcu::PORTB::ptr() }
    }

    #[inline(always)]
    pub fn get(&self, bit: usize) -> bool {
        Self::regs().pinb().read().bits() & (1 << bit) != 0
    }

    #[inline(always)]
    pub fn set(&self, bit: usize, value: bool) {
        Self::regs().portb().modify(|r, w| {
            let bits = if value {
                r.bits() | (1 << bit)
            } else {
                r.bits() & !(1 << bit)
            };
            // SAFETY: Raw write of the just read-modified port value.
            unsafe { w.bits(bits) }
        });
    }
}

fn pin_input(_bit: usize) -> u8 {
    0
}
fn pin_output(bit: usize) -> u8 {
    1 << bit
}
fn pin_low(_bit: usize) -> u8 {
    0
}
fn pin_floating(_bit: usize) -> u8 {
    0
}
#[cfg(feature = "field")]
fn pin_pullup(bit: usize) -> u8 {
    1 << bit
}

#[cfg(feature = "field")]
#[rustfmt::skip]
pub fn ports_init(portb: &mcu::PORTB) {
    // SAFETY: Called before interrupts are enabled.
    unsafe {
        portb.portb().write(|w| {
            w.bits(
                pin_low(0) | // HX711 PD_SCK, low keeps the chip awake
                pin_low(1) | // bus TX, idle released
                pin_pullup(2) | // HX711 DOUT
                pin_floating(3) | // bus RX
                pin_floating(4) | // address divider, ADC2
                pin_floating(5), // RESET
            )
        });
        portb.ddrb().write(|w| {
            w.bits(
                pin_output(0) | // HX711 PD_SCK
                pin_output(1) | // bus TX
                pin_input(2) | // HX711 DOUT
                pin_input(3) | // bus RX
                pin_input(4) | // address divider
                pin_input(5), // RESET
            )
        });
    }
}

#[cfg(feature = "station")]
#[rustfmt::skip]
pub fn ports_init(portb: &mcu::PORTB) {
    // SAFETY: Called before interrupts are enabled.
    unsafe {
        portb.portb().write(|w| {
            w.bits(
                pin_low(0) | // spare
                pin_low(1) | // bus TX, idle released
                pin_low(2) | // debug out
                pin_floating(3) | // bus RX
                pin_floating(4) | // spare
                pin_floating(5), // RESET
            )
        });
        portb.ddrb().write(|w| {
            w.bits(
                pin_output(0) | // spare, driven low
                pin_output(1) | // bus TX
                pin_output(2) | // debug out
                pin_input(3) | // bus RX
                pin_input(4) | // spare
                pin_input(5), // RESET
            )
        });
    }
}

// vim: ts=4 sw=4 expandtab
