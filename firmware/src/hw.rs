pub use attiny::{self as mcu, Peripherals};
pub use avr_device::attiny85 as attiny;
pub use avr_device::interrupt::{self, CriticalSection, Mutex};

macro_rules! define_isr {
    ($name:ident, $handler:path) => {
        #[avr_device::interrupt(attiny85)]
        fn $name() {
            // SAFETY: We are inside of an interrupt handler with
            //         interrupts globally disabled.
            let cs = unsafe { CriticalSection::new() };
            $handler(cs);
        }
    };
}

define_isr!(PCINT0, crate::bus::irq_handler_pcint);

// vim: ts=4 sw=4 expandtab
