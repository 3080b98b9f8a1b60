//! Glue between the portable bus core and the ATtiny pins.

use crate::{
    hw::{interrupt, mcu},
    mutex::{CriticalSection, MutexRefCell},
    ports::PORTB,
    timer,
};
#[cfg(feature = "field")]
use avr_int24::Int24;
use owbus::{
    decoder::{Node, Role},
    io::BusIo,
    timing::Timestamp,
    txn::{self, NodeAccess},
};

/// PB1 drives the bus.
const TX_BIT: usize = 1;
/// PB3 senses the bus and raises PCINT3.
const RX_BIT: usize = 3;

/// Direct register access to the bus pins and the time base.
pub struct HwIo;

impl BusIo for HwIo {
    #[inline(always)]
    fn drive(&mut self, level: bool) {
        PORTB.set(TX_BIT, level);
    }

    #[inline(always)]
    fn sense(&mut self) -> bool {
        PORTB.get(RX_BIT)
    }

    #[inline(always)]
    fn now(&mut self) -> Timestamp {
        // SAFETY: HwIo only runs from the edge ISR or from inside
        //         interrupt::free sections, so interrupts are disabled
        //         here in all cases.
        let cs = unsafe { CriticalSection::new() };
        timer::timer_get(cs)
    }
}

// The one shared bus node.  Mutated from the edge ISR and from
// main-line code, always under a critical section.
static NODE: MutexRefCell<Node<HwIo>> = MutexRefCell::new(Node::new(HwIo));

pub fn bus_init(cs: CriticalSection<'_>, exint: &mcu::EXINT, role: Role, address: u8) {
    NODE.borrow_mut(cs).configure(role, address);

    // Pin change interrupt on the RX pin, both edge directions.
    // SAFETY: Raw write of the pin change mask.
    exint.pcmsk().write(|w| unsafe { w.bits(1 << RX_BIT) });
    exint.gifr().write(|w| w.pcif().set_bit());
    exint.gimsk().write(|w| w.pcie().set_bit());
}

/// Pin change ISR: one decoder step per RX transition.
///
/// A listener that matches the address replies from right here and
/// keeps interrupts blocked for the whole reply transmission.  Edges
/// we generate ourselves leave one pending pin change behind; the
/// decoder's silence reset absorbs that stray invocation.
pub fn irq_handler_pcint(cs: CriticalSection<'_>) {
    NODE.borrow_mut(cs).on_edge();
}

/// [NodeAccess] through one interrupt-disabled section per access.
pub struct BusHandle;

impl NodeAccess for BusHandle {
    type Io = HwIo;

    fn with<R>(&mut self, f: impl FnOnce(&mut Node<HwIo>) -> R) -> R {
        interrupt::free(|cs| f(&mut NODE.borrow_mut(cs)))
    }
}

/// Stage the next reply payload of this listener node.
#[cfg(feature = "field")]
pub fn set_payload(value: Int24) {
    txn::set_payload(&mut BusHandle, value);
}

/// Request the payload of the node at `target`.
#[cfg(feature = "station")]
pub fn request(target: u8) -> Option<Int24> {
    txn::request(&mut BusHandle, target)
}

// vim: ts=4 sw=4 expandtab
