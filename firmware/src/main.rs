#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]
#![feature(asm_experimental_arch)]

#[cfg(all(feature = "field", feature = "station"))]
compile_error!("Select either the 'field' or the 'station' feature, not both.");
#[cfg(not(any(feature = "field", feature = "station")))]
compile_error!("Select one of the 'field' or 'station' features.");

#[cfg(feature = "field")]
mod addr;
mod bus;
mod hw;
#[cfg(feature = "field")]
mod hx;
mod mutex;
mod ports;
mod timer;

use crate::{
    hw::{interrupt, mcu, Peripherals},
    mutex::unwrap_option,
    ports::ports_init,
    timer::timer_init,
};
#[cfg(feature = "field")]
use crate::hx::hx_init;
#[cfg(feature = "field")]
use hx711::Gain;
use owbus::decoder::Role;
#[cfg(feature = "station")]
use owbus::timing::RelTimestamp;

fn wdt_init() {
    // SAFETY: The asm code only accesses the WDT registers
    //         which are not accessed from anywhere else in the program.
    unsafe {
        // Enable WDT with timeout 32.5 ms
        core::arch::asm!(
            "ldi {tmp}, 0x10", // WDCE=1
            "out {WDTCR}, {tmp}",
            "ldi {tmp}, 0x19", // WDCE=1, WDE=1, WDP2=0, WDP1=0, WDP0=1
            "out {WDTCR}, {tmp}",
            tmp = out(reg_upper) _,
            WDTCR = const 0x21,
            options(nostack, preserves_flags)
        );
    }
}

fn wdt_poke(_wp: &mcu::WDT) {
    avr_device::asm::wdr();
}

/// Sensor node duty cycle: hand each finished conversion to the bus
/// as the staged reply payload.
#[cfg(feature = "field")]
fn main_loop(dp: &Peripherals) -> ! {
    let mut hx = hx_init();
    loop {
        // Keeps the software extended clock fresh while the bus is idle.
        let _ = interrupt::free(|cs| timer::timer_get(cs));

        if hx.is_ready() {
            bus::set_payload(hx.read(Gain::ChanA128));
        }

        wdt_poke(&dp.WDT);
    }
}

/// Bench station duty cycle: periodically poll the node under test and
/// mirror the outcome on the debug pin.
#[cfg(feature = "station")]
fn main_loop(dp: &Peripherals) -> ! {
    /// Address of the node under test.
    const TEST_ADDRESS: u8 = 0b1010;
    /// Idle time between polls.
    const POLL_INTERVAL: RelTimestamp = RelTimestamp::from_micros(100_000);

    const DEBUG_BIT: usize = 2;

    let mut next_poll = interrupt::free(|cs| timer::timer_get(cs));
    loop {
        let now = interrupt::free(|cs| timer::timer_get(cs));
        if now >= next_poll {
            next_poll = now + POLL_INTERVAL;
            let got_reply = bus::request(TEST_ADDRESS).is_some();
            interrupt::free(|_| ports::PORTB.set(DEBUG_BIT, got_reply));
        }

        wdt_poke(&dp.WDT);
    }
}

#[avr_device::entry]
fn main() -> ! {
    wdt_init();

    let dp = unwrap_option(Peripherals::take());

    ports_init(&dp.PORTB);

    interrupt::free(|cs| {
        timer_init(&dp.TC0);

        #[cfg(feature = "field")]
        let (role, address) = (Role::Listener, addr::read_address(&dp.ADC));
        #[cfg(feature = "station")]
        let (role, address) = (Role::Requester, 0);

        bus::bus_init(cs, &dp.EXINT, role, address);
    });

    // SAFETY: All static state is initialized.
    unsafe { interrupt::enable() };

    main_loop(&dp)
}

// vim: ts=4 sw=4 expandtab
