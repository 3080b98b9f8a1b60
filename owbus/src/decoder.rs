//! The per-node bus state machine.
//!
//! [Node::on_edge] is entered once per electrical transition of the RX
//! line, from interrupt context on the target.  All other methods are
//! main-line API and must be called under the same mutual exclusion as
//! the interrupt handler (see [crate::txn::NodeAccess]).

use crate::{
    codec,
    io::BusIo,
    timing::{
        ADDRESS_WIDTH, DATA_WIDTH, MAX_ADDRESS, NOISE_WINDOW_US, PAYLOAD_MASK, RESYNC_SILENCE_US,
        Timestamp,
    },
};
use avr_int24::Int24;

/// Behavior of this node on the bus.
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum Role {
    /// Waits for its own address and replies with the staged payload.
    Listener,
    /// Initiates transactions and decodes the replies.
    Requester,
}

/// One bus participant: the decoder state that lives across edge
/// interrupts, plus the handoff fields shared with main-line code.
///
/// On the target a single instance lives in a static and every access
/// runs inside a critical section, so the interrupt handler never
/// observes a partially updated payload.
pub struct Node<IO> {
    io: IO,
    role: Role,
    address: u8,

    // Decoder state, persistent across edge interrupts.
    last_edge: Timestamp,
    bit_count: u8,
    ignore_count: u8,
    accum: u32,

    // Handoff between interrupt and main-line code.
    outgoing: Int24,
    incoming: Int24,
    received: bool,
}

impl<IO: BusIo> Node<IO> {
    pub const fn new(io: IO) -> Self {
        Self {
            io,
            role: Role::Listener,
            address: 0,
            last_edge: Timestamp::new(),
            bit_count: 0,
            ignore_count: 0,
            accum: 0,
            outgoing: Int24::zero(),
            incoming: Int24::zero(),
            received: false,
        }
    }

    /// Set role and own address.  Called once before the edge
    /// interrupt is enabled; the decoder treats both as read-only.
    pub fn configure(&mut self, role: Role, address: u8) {
        self.role = role;
        self.address = address & MAX_ADDRESS;
    }

    #[inline]
    pub fn now(&mut self) -> Timestamp {
        self.io.now()
    }

    #[inline]
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    /// Stage `value` as the next reply payload.
    ///
    /// The value in effect at the moment an address matches is what
    /// gets sent; there is no queue.
    pub fn set_payload(&mut self, value: Int24) {
        self.outgoing = value;
    }

    /// Fetch the decoded reply payload, if a full frame arrived since
    /// the last request.
    pub fn take_received(&mut self) -> Option<Int24> {
        if self.received {
            self.received = false;
            Some(self.incoming)
        } else {
            None
        }
    }

    /// Send the address frame of a new request attempt.
    ///
    /// Must run with the edge interrupt masked: neither the flag
    /// handshake nor our own transmission may be observed by our own
    /// decoder.  Blocks for the address transmission time.
    pub fn begin_request(&mut self, target: u8) {
        self.received = false;
        self.bit_count = 0;
        self.ignore_count = 0;
        self.accum = 0;
        codec::send_bits(&mut self.io, (target & MAX_ADDRESS) as u32, ADDRESS_WIDTH);
    }

    /// Decoder state machine, entered once per RX transition.
    ///
    /// A listener that sees its own address replies from right here,
    /// which keeps the interrupt context busy for
    /// `DATA_WIDTH * BIT_PERIOD_US`.  That is the price for
    /// deterministic reply timing.
    pub fn on_edge(&mut self) {
        let t = self.io.now();
        let level = self.io.sense();
        let delta = t.micros_since(self.last_edge);

        if delta < NOISE_WINDOW_US {
            // Bounce from line settling.  Keep the previous edge as
            // the timing reference; the next edge is measured against
            // it.
            return;
        }
        self.last_edge = t;

        if delta > RESYNC_SILENCE_US {
            // Silence ended: this edge starts a new frame or recovers
            // from a dropped one.  It only re-arms the decoder and
            // carries no data bit.
            self.bit_count = 0;
            self.ignore_count = 0;
            self.accum = 0;
            return;
        }

        if self.ignore_count > 0 {
            // Part of a reply addressed to some other node.
            self.ignore_count -= 1;
            return;
        }

        self.accum = (self.accum << 1) | level as u32;
        self.bit_count += 1;

        match self.role {
            Role::Listener => {
                if self.bit_count == ADDRESS_WIDTH {
                    if self.accum as u8 == self.address {
                        self.send_reply();
                    } else {
                        self.ignore_count = DATA_WIDTH;
                    }
                    self.bit_count = 0;
                    self.accum = 0;
                }
            }
            Role::Requester => {
                if self.bit_count == DATA_WIDTH {
                    self.incoming = Int24::from_i32(codec::sign_extend(self.accum));
                    self.received = true;
                    self.bit_count = 0;
                    self.ignore_count = 0;
                    self.accum = 0;
                }
            }
        }
    }

    fn send_reply(&mut self) {
        let raw = self.outgoing.to_i32() as u32 & PAYLOAD_MASK;
        codec::send_bits(&mut self.io, raw, DATA_WIDTH);
    }
}


// vim: ts=4 sw=4 expandtab
