//! Simulated wire for the test suite.
//!
//! Transmissions are recorded as timestamped edges and moved between
//! [Node] instances by hand, which models the real system: the edge
//! interrupt of one node runs between the critical sections of the
//! others.  The virtual clock advances by one microsecond per read so
//! that every busy-wait loop terminates.

use crate::{
    codec::send_bits,
    decoder::{Node, Role},
    io::BusIo,
    timing::Timestamp,
    txn::NodeAccess,
};
use avr_int24::Int24;
use std::vec::Vec;

/// One recorded transition.
#[derive(Copy, Clone, Debug)]
pub struct Edge {
    pub t: Timestamp,
    pub level: bool,
}

impl Edge {
    pub fn new(t: u32, level: bool) -> Self {
        Self {
            t: Timestamp(t),
            level,
        }
    }
}

/// Simulated line driver and clock.
pub struct SimIo {
    pub clock: u32,
    pub rx: bool,
    pub tx: bool,
    pub sent: Vec<Edge>,
}

impl SimIo {
    pub fn new() -> Self {
        Self {
            // Keep zero well in the past so the first edge always
            // exceeds the resync silence.
            clock: 1000,
            rx: false,
            tx: false,
            sent: Vec::new(),
        }
    }
}

impl BusIo for SimIo {
    fn drive(&mut self, level: bool) {
        if level != self.tx {
            self.tx = level;
            self.sent.push(Edge {
                t: Timestamp(self.clock),
                level,
            });
        }
    }

    fn sense(&mut self) -> bool {
        self.rx
    }

    fn now(&mut self) -> Timestamp {
        self.clock = self.clock.wrapping_add(1);
        Timestamp(self.clock)
    }
}

/// Record the edge train of one transmission started at `start`.
pub fn frame(value: u32, count: u8, start: u32) -> Vec<Edge> {
    let mut io = SimIo::new();
    io.clock = start;
    send_bits(&mut io, value, count);
    io.sent
}

/// Deliver recorded edges to a node, one interrupt per edge.
pub fn feed(node: &mut Node<SimIo>, edges: &[Edge]) {
    for e in edges {
        let io = node.io_mut();
        if Timestamp(e.t.0) > Timestamp(io.clock) {
            io.clock = e.t.0;
        }
        io.rx = e.level;
        node.on_edge();
    }
}

/// A requester and a set of listeners on one simulated bus.
///
/// Implements [NodeAccess] for the requester: after every critical
/// section, pending edges are moved across the wire until it is quiet,
/// the way real interrupt handlers run between critical sections.
pub struct SimNet {
    pub requester: Node<SimIo>,
    pub listeners: Vec<Node<SimIo>>,
}

impl SimNet {
    pub fn new() -> Self {
        let mut requester = Node::new(SimIo::new());
        requester.configure(Role::Requester, 0);
        Self {
            requester,
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, address: u8, payload: i32) {
        let mut n = Node::new(SimIo::new());
        n.configure(Role::Listener, address);
        n.set_payload(Int24::from_i32(payload));
        self.listeners.push(n);
    }

    fn pump(&mut self) {
        loop {
            let mut moved = false;

            let out = core::mem::take(&mut self.requester.io_mut().sent);
            if !out.is_empty() {
                moved = true;
                for l in &mut self.listeners {
                    feed(l, &out);
                }
            }

            for i in 0..self.listeners.len() {
                let out = core::mem::take(&mut self.listeners[i].io_mut().sent);
                if out.is_empty() {
                    continue;
                }
                moved = true;
                feed(&mut self.requester, &out);
                for (j, l) in self.listeners.iter_mut().enumerate() {
                    if j != i {
                        feed(l, &out);
                    }
                }
            }

            if !moved {
                break;
            }
        }
    }
}

impl NodeAccess for SimNet {
    type Io = SimIo;

    fn with<R>(&mut self, f: impl FnOnce(&mut Node<SimIo>) -> R) -> R {
        let ret = f(&mut self.requester);
        self.pump();
        ret
    }
}

// vim: ts=4 sw=4 expandtab
