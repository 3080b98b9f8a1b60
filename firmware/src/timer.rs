use crate::{
    hw::mcu,
    mutex::{CriticalSection, MutexCell},
};
use owbus::timing::Timestamp;

/// TC0 tick length: prescaler 8 at 8 MHz core clock.
pub const TIMER_TICK_US: u32 = 1;

static TIMER_HIGH: MutexCell<u32> = MutexCell::new(0);

#[rustfmt::skip]
pub fn timer_init(tc0: &mcu::TC0) {
    // Timer 0 configuration:
    // Normal mode, CS: 8 -> 1 us per timer tick.
    tc0.tccr0a().write(|w| w);
    tc0.tccr0b().write(|w| w.cs0().prescale_8());
    // SAFETY: Raw write of the counter start value.
    tc0.tcnt0().write(|w| unsafe { w.bits(0) });
}

/// Read the monotonic microsecond clock.
///
/// The hardware counter is 8 bits wide; the upper part is carried in
/// software by consuming the overflow flag here.  Some context must
/// therefore call this at least once per 256 us.  Every busy-wait loop
/// in this firmware goes through here, which satisfies that.
#[inline(never)]
pub fn timer_get(cs: CriticalSection<'_>) -> Timestamp {
    // SAFETY: Single volatile register accesses; the overflow flag
    //         handshake is serialized by the critical section.
    let tc0 = unsafe { &*mcu::TC0::ptr() };

    let mut high = TIMER_HIGH.get(cs);
    let mut low = tc0.tcnt0().read().bits();

    // Fold a pending overflow into the upper part, then re-read the
    // counter so low and high agree.
    if tc0.tifr().read().tov0().bit_is_set() {
        tc0.tifr().write(|w| w.tov0().set_bit());
        low = tc0.tcnt0().read().bits();
        high = high.wrapping_add(1);
        TIMER_HIGH.set(cs, high);
    }

    Timestamp(((high << 8) | low as u32).wrapping_mul(TIMER_TICK_US))
}

// vim: ts=4 sw=4 expandtab
