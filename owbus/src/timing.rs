//! Bit timing parameters and the time base of the bus.
//!
//! All nodes sharing one bus must be built with identical values.

/// Time budget for one transmitted bit, in microseconds.
pub const BIT_PERIOD_US: u32 = 65;

/// Minimum time the line rests after the edge that carries a bit,
/// in microseconds.
pub const PULSE_PERIOD_US: u32 = 15;

/// Number of bits in an address field.
pub const ADDRESS_WIDTH: u8 = 4;

/// Number of bits in a payload field.
pub const DATA_WIDTH: u8 = 24;

/// Number of request attempts before giving up on an address.
pub const NUM_ATTEMPTS: u8 = 3;

/// Time to wait for a reply after sending a request, in microseconds.
pub const TIMEOUT_COMMS_US: u32 = 2000;

/// Edges closer than this to the previously accepted edge are treated
/// as contact bounce and do not touch the decoder state.
pub const NOISE_WINDOW_US: u32 = 3 * PULSE_PERIOD_US;

/// Silence longer than this ends any frame in progress and re-arms
/// the decoder.
pub const RESYNC_SILENCE_US: u32 = 2 * BIT_PERIOD_US;

/// Highest encodable node address.
pub const MAX_ADDRESS: u8 = (1 << ADDRESS_WIDTH) - 1;

/// Mask of the payload field.
pub const PAYLOAD_MASK: u32 = (1 << DATA_WIDTH) - 1;

// The noise window must not be able to swallow legitimate data edges,
// which arrive BIT_PERIOD_US apart.
const _: () = assert!(PULSE_PERIOD_US < BIT_PERIOD_US);
const _: () = assert!(NOISE_WINDOW_US < BIT_PERIOD_US);
const _: () = assert!(BIT_PERIOD_US < RESYNC_SILENCE_US);

/// A point in time on the monotonic microsecond clock.
///
/// The clock wraps.  Comparisons are wrapping, so two timestamps can
/// be ordered as long as they are less than half the clock range
/// apart.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct Timestamp(pub u32);

impl Timestamp {
    #[inline]
    pub const fn new() -> Self {
        Timestamp(0)
    }

    #[inline]
    pub const fn from_micros(us: u32) -> Self {
        Timestamp(us)
    }

    /// Microseconds elapsed since `earlier`, with wrap-around.
    #[inline]
    pub const fn micros_since(self, earlier: Timestamp) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }
}

impl Default for Timestamp {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Ord for Timestamp {
    #[inline]
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        if self.0 == other.0 {
            core::cmp::Ordering::Equal
        } else if self.0.wrapping_sub(other.0) & (1 << (u32::BITS - 1)) == 0 {
            core::cmp::Ordering::Greater
        } else {
            core::cmp::Ordering::Less
        }
    }
}

impl PartialOrd for Timestamp {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::ops::Add<RelTimestamp> for Timestamp {
    type Output = Self;

    #[inline]
    fn add(self, other: RelTimestamp) -> Self::Output {
        Timestamp(self.0.wrapping_add(other.0 as u32))
    }
}

impl core::ops::Sub for Timestamp {
    type Output = RelTimestamp;

    #[inline]
    fn sub(self, other: Self) -> Self::Output {
        RelTimestamp(self.0.wrapping_sub(other.0) as i32)
    }
}

impl From<u32> for Timestamp {
    #[inline]
    fn from(stamp: u32) -> Self {
        Timestamp(stamp)
    }
}

/// A time distance on the monotonic microsecond clock.
#[derive(PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Debug)]
pub struct RelTimestamp(pub i32);

impl RelTimestamp {
    #[inline]
    pub const fn new() -> Self {
        RelTimestamp(0)
    }

    #[inline]
    pub const fn from_micros(us: i32) -> Self {
        RelTimestamp(us)
    }
}

impl Default for RelTimestamp {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl core::ops::Add for RelTimestamp {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self::Output {
        RelTimestamp(self.0.wrapping_add(other.0))
    }
}

impl core::ops::Sub for RelTimestamp {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self::Output {
        RelTimestamp(self.0.wrapping_sub(other.0))
    }
}

impl From<i32> for RelTimestamp {
    #[inline]
    fn from(relstamp: i32) -> Self {
        RelTimestamp(relstamp)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrapping_order() {
        let a = Timestamp(10);
        let b = Timestamp(20);
        assert!(a < b);
        assert!(b > a);

        let a = Timestamp(u32::MAX - 5);
        let b = Timestamp(4);
        assert!(a < b);
        assert!(b > a);
        assert_eq!((b - a).0, 10);
    }

    #[test]
    fn test_micros_since() {
        let a = Timestamp(1000);
        let b = Timestamp(1065);
        assert_eq!(b.micros_since(a), 65);

        let a = Timestamp(u32::MAX - 4);
        let b = Timestamp(5);
        assert_eq!(b.micros_since(a), 10);
    }

    #[test]
    fn test_add_rel() {
        let t = Timestamp(100) + RelTimestamp::from_micros(65);
        assert_eq!(t.0, 165);

        let t = Timestamp(u32::MAX) + RelTimestamp::from_micros(2);
        assert_eq!(t.0, 1);
    }
}

// vim: ts=4 sw=4 expandtab
