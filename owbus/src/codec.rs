//! Pulse-width edge encoding of bit fields.
//!
//! A frame starts with a wake pulse: the line is driven high for
//! [PULSE_PERIOD_US].  Its edge carries no data; it re-arms all
//! receivers and anchors their timing.  Each bit `b` is then sent by
//! holding the complement of `b` for `BIT_PERIOD_US - PULSE_PERIOD_US`
//! and flipping to `b` for the remaining `PULSE_PERIOD_US`.  The flip
//! is the one edge per bit that receivers accept, `BIT_PERIOD_US`
//! after the previous accepted edge, and its sampled level is the bit
//! value.  The optional edge at the start of a bit falls inside the
//! receivers' noise window and is skipped there.  After the last bit
//! the line is released to idle.

use crate::{
    io::BusIo,
    timing::{BIT_PERIOD_US, DATA_WIDTH, PULSE_PERIOD_US, RelTimestamp},
};

/// Transmit the lowest `count` bits of `value`, MSB first.
///
/// Blocks for `PULSE_PERIOD_US + count * BIT_PERIOD_US`.  The line
/// must be idle when this is called and is released again afterwards.
pub fn send_bits<IO: BusIo>(io: &mut IO, value: u32, count: u8) {
    let mut t = io.now();

    // Wake pulse.
    io.drive(true);
    t = t + RelTimestamp::from_micros(PULSE_PERIOD_US as i32);
    io.wait_until(t);

    let mut i = count;
    while i > 0 {
        i -= 1;
        let bit = (value >> i) & 1 != 0;

        io.drive(!bit);
        t = t + RelTimestamp::from_micros((BIT_PERIOD_US - PULSE_PERIOD_US) as i32);
        io.wait_until(t);

        io.drive(bit);
        t = t + RelTimestamp::from_micros(PULSE_PERIOD_US as i32);
        io.wait_until(t);
    }

    io.drive(false);
}

/// Sign-extend a raw `DATA_WIDTH` bit payload field to i32.
#[inline]
pub const fn sign_extend(raw: u32) -> i32 {
    ((raw << (32 - DATA_WIDTH as u32)) as i32) >> (32 - DATA_WIDTH as u32)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::SimIo;

    #[test]
    fn test_edge_train() {
        let mut io = SimIo::new();
        io.clock = 10_000;
        send_bits(&mut io, 0b1010, 4);

        // Wake edge, then one accepted (bit value) edge per bit at
        // BIT_PERIOD_US spacing.  Start-of-bit edges only appear where
        // the new complement differs from the resting level.
        let got: std::vec::Vec<(u32, bool)> =
            io.sent.iter().map(|e| (e.t.0, e.level)).collect();
        assert_eq!(
            got,
            std::vec![
                (10_001, true),  // wake
                (10_016, false), // start of bit 3 (complement of 1)
                (10_066, true),  // bit 3 = 1
                (10_131, false), // bit 2 = 0
                (10_196, true),  // bit 1 = 1
                (10_261, false), // bit 0 = 0
            ]
        );
        // Line released to idle.
        assert!(!io.tx);
    }

    #[test]
    fn test_all_ones_has_start_edges() {
        let mut io = SimIo::new();
        io.clock = 10_000;
        send_bits(&mut io, 0b11, 2);

        let got: std::vec::Vec<(u32, bool)> =
            io.sent.iter().map(|e| (e.t.0, e.level)).collect();
        assert_eq!(
            got,
            std::vec![
                (10_001, true),  // wake
                (10_016, false), // start of bit 1
                (10_066, true),  // bit 1 = 1
                (10_081, false), // start of bit 0
                (10_131, true),  // bit 0 = 1
                (10_146, false), // release
            ]
        );
        assert!(!io.tx);
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0x00_0000), 0);
        assert_eq!(sign_extend(0x00_002A), 42);
        assert_eq!(sign_extend(0xFF_FFFF), -1);
        assert_eq!(sign_extend(0x80_0000), -0x80_0000);
        assert_eq!(sign_extend(0x7F_FFFF), 0x7F_FFFF);
    }
}

// vim: ts=4 sw=4 expandtab
