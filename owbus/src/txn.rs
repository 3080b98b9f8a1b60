//! Requester and listener side transaction API.

use crate::{
    decoder::Node,
    io::BusIo,
    timing::{MAX_ADDRESS, NUM_ATTEMPTS, RelTimestamp, TIMEOUT_COMMS_US},
};
use avr_int24::Int24;

/// Mutually exclusive entry to the shared [Node] instance.
///
/// On the target every closure passed to [NodeAccess::with] runs with
/// interrupts disabled, so the closures must stay bounded and short.
/// The edge interrupt runs between the calls.
pub trait NodeAccess {
    type Io: BusIo;

    fn with<R>(&mut self, f: impl FnOnce(&mut Node<Self::Io>) -> R) -> R;
}

/// Request the payload of the node at address `target`.
///
/// Sends the address frame and polls for the decoded reply until the
/// per-attempt deadline, retrying up to [NUM_ATTEMPTS] times in total.
/// Returns `None` when no node answered.  An absent node is a normal
/// outcome on a shared bus, not an error; the caller decides the retry
/// cadence at its own level.
pub fn request<A: NodeAccess>(acc: &mut A, target: u8) -> Option<Int24> {
    debug_assert!(target <= MAX_ADDRESS);

    for _ in 0..NUM_ATTEMPTS {
        // Flag clear and address transmission share one critical
        // section: our own decoder must observe neither, and the
        // decoder must not set the flag between clear and send.
        acc.with(|n| n.begin_request(target));

        let deadline =
            acc.with(|n| n.now()) + RelTimestamp::from_micros(TIMEOUT_COMMS_US as i32);
        loop {
            if let Some(payload) = acc.with(|n| n.take_received()) {
                return Some(payload);
            }
            if acc.with(|n| n.now()) >= deadline {
                break;
            }
        }
    }
    None
}

/// Stage `value` as this listener's next reply payload.
///
/// Safe to call from main-line code at any time; the decoder replies
/// with the latest committed value.
pub fn set_payload<A: NodeAccess>(acc: &mut A, value: Int24) {
    acc.with(|n| n.set_payload(value));
}


// vim: ts=4 sw=4 expandtab
