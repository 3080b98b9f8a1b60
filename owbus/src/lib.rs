//! Half-duplex single-conductor bus for small sensor nodes.
//!
//! Up to 16 addressed nodes share one line.  A requester broadcasts a
//! 4 bit address; the listener with that address replies in-frame with
//! one signed 24 bit payload.  Bits travel as pulse-width encoded
//! edges, decoded from edge intervals inside a pin change interrupt.
//!
//! The protocol core is hardware independent.  It runs on top of the
//! [io::BusIo] capability, implemented with direct port access on the
//! target and with a simulated wire in the test suite.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod codec;
pub mod decoder;
pub mod io;
pub mod timing;
pub mod txn;

#[cfg(test)]
pub(crate) mod sim;

// vim: ts=4 sw=4 expandtab
