use crate::timing::Timestamp;

/// Low level access to the bus wiring and the time base.
///
/// The protocol core is generic over this trait.  The firmware
/// implements it with direct port register accesses for minimum
/// latency; the test suite implements it with a simulated wire.
///
/// `drive` and `sense` refer to two separate pins (TX and RX) that are
/// electrically tied to the one shared conductor.
pub trait BusIo {
    /// Drive the TX line to `level`.  `false` is the released idle
    /// state of the bus.
    fn drive(&mut self, level: bool);

    /// Sample the current RX line level.
    fn sense(&mut self) -> bool;

    /// Read the monotonic microsecond clock.
    fn now(&mut self) -> Timestamp;

    /// Busy-wait until the clock reaches `t`.
    fn wait_until(&mut self, t: Timestamp) {
        while self.now() < t {}
    }
}

// vim: ts=4 sw=4 expandtab
