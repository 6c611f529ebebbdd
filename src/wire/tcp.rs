//! TCP sequence number arithmetic.
//!
//! TCP describes stream positions with 32-bit sequence numbers that start at
//! a random initial value and wrap around. Internally the stream machinery in
//! [`crate::layer::tcp`] works with 64-bit absolute offsets that start at
//! zero and never wrap; this module converts between the two views.

use core::fmt;

/// A 32-bit wrapping sequence number, relative to an arbitrary zero point.
///
/// Absolute offset 0 maps to the zero point itself (the sequence number of
/// the SYN), offset 1 to the zero point plus one, and so on modulo `2^32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SeqNum(pub u32);

impl SeqNum {
    /// Wrap an absolute offset into the sequence space anchored at `zero_point`.
    pub fn wrap(offset: u64, zero_point: SeqNum) -> SeqNum {
        SeqNum(zero_point.0.wrapping_add(offset as u32))
    }

    /// Recover the absolute offset that wraps to `self`, closest to `checkpoint`.
    ///
    /// Infinitely many absolute offsets map to the same sequence number, one
    /// per `2^32` window. A stream position known to be near `checkpoint`
    /// disambiguates: of the two candidates bracketing the checkpoint the one
    /// within `2^31` of it is returned. Negative candidates are never
    /// returned; close to offset zero the result may therefore be further
    /// than `2^31` from the checkpoint.
    pub fn unwrap(self, zero_point: SeqNum, checkpoint: u64) -> u64 {
        const WINDOW: u64 = 1 << 32;

        let distance = u64::from(self.0.wrapping_sub(zero_point.0));
        let mut offset = distance + (checkpoint / WINDOW) * WINDOW;
        if checkpoint > offset && checkpoint - offset > WINDOW / 2 {
            offset += WINDOW;
        } else if offset > checkpoint && offset - checkpoint > WINDOW / 2 && offset > WINDOW {
            offset -= WINDOW;
        }
        offset
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
