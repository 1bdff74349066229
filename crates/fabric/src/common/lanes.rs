//! Bus width and four-state-style data words.
//!
//! Handshake data lines carry a [`LaneWord`]: a value plus a per-byte-lane "known" mask. Lanes
//! that were never written (or that a master drives as don't-care) are unknown, so an unwritten
//! word is distinguishable from any word holding real data.

use std::fmt;

use super::error::{FabricError, Result};

/// Data bus width, validated once at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BusWidth(u32);

impl BusWidth {
    /// 32-bit bus, the width every default in the fabric assumes.
    pub const W32: Self = Self(4);

    /// Validates a width in bytes (1, 2, 4 or 8).
    pub fn new(bytes: u32) -> Result<Self> {
        match bytes {
            1 | 2 | 4 | 8 => Ok(Self(bytes)),
            other => Err(FabricError::InvalidBusWidth(other)),
        }
    }

    /// Width in bytes; also the size of one beat.
    pub const fn bytes(self) -> u32 {
        self.0
    }

    /// Number of byte lanes.
    pub const fn lanes(self) -> usize {
        self.0 as usize
    }

    /// Mask with one bit set per byte lane.
    pub const fn lane_mask(self) -> u8 {
        ((1u16 << self.0) - 1) as u8
    }
}

impl Default for BusWidth {
    fn default() -> Self {
        Self::W32
    }
}

/// A bus word with per-lane validity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LaneWord {
    value: u64,
    known: u8,
}

impl LaneWord {
    /// A word with every lane unknown; what an unwritten sparse location reads as.
    pub const UNDEFINED: Self = Self { value: 0, known: 0 };

    /// A fully known word on a bus of `width`.
    pub const fn defined(value: u64, width: BusWidth) -> Self {
        let bits = width.bytes() * 8;
        let value = if bits == 64 {
            value
        } else {
            value & ((1u64 << bits) - 1)
        };
        Self {
            value,
            known: width.lane_mask(),
        }
    }

    /// Returns lane `lane`, or `None` when it is unknown.
    pub const fn lane(self, lane: usize) -> Option<u8> {
        if self.known & (1 << lane) == 0 {
            None
        } else {
            Some((self.value >> (lane * 8)) as u8)
        }
    }

    /// Replaces lane `lane` with a known byte.
    #[must_use]
    pub const fn with_lane(self, lane: usize, byte: u8) -> Self {
        let shift = lane * 8;
        Self {
            value: (self.value & !(0xFF << shift)) | ((byte as u64) << shift),
            known: self.known | (1 << lane),
        }
    }

    /// Copies every lane selected in `sel` from `other` into `self`.
    #[must_use]
    pub const fn merge(self, other: Self, sel: u8) -> Self {
        let mut word = self;
        let mut lane = 0;
        while lane < 8 {
            if sel & (1 << lane) != 0 {
                let shift = lane * 8;
                word.value = (word.value & !(0xFF << shift)) | (other.value & (0xFF << shift));
                word.known = (word.known & !(1 << lane)) | (other.known & (1 << lane));
            }
            lane += 1;
        }
        word
    }

    /// Returns the value if every lane of `width` is known.
    pub const fn value(self, width: BusWidth) -> Option<u64> {
        if self.known & width.lane_mask() == width.lane_mask() {
            Some(self.value)
        } else {
            None
        }
    }

    /// Mask of known lanes.
    pub const fn known_lanes(self) -> u8 {
        self.known
    }
}

impl fmt::Debug for LaneWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LaneWord({:#x}, known={:#010b})", self.value, self.known)
    }
}
