//! Request/acknowledge signal bundles of the handshake interface.
//!
//! The naming follows the usual Wishbone master/slave port convention: `cyc`/`stb` frame a
//! request, `we` selects a write, `sel` carries one enable bit per byte lane and `ack` closes
//! the beat.

use crate::common::LaneWord;

/// Outputs driven by the bridge (master) towards the slave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MasterSignals {
    /// Bus cycle in progress.
    pub cyc: bool,
    /// Strobe: a valid request is on the bus.
    pub stb: bool,
    /// Write enable.
    pub we: bool,
    /// Word address (byte address divided by the bus width).
    pub adr: u64,
    /// Write data; disabled lanes are driven as don't-care (unknown).
    pub dat: LaneWord,
    /// Byte-lane select, one bit per lane.
    pub sel: u8,
}

impl MasterSignals {
    /// Returns `true` while a request is framed by both `cyc` and `stb`.
    pub const fn request(&self) -> bool {
        self.cyc && self.stb
    }
}

/// Outputs driven by the slave back to the bridge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlaveSignals {
    /// Acknowledge for the current beat.
    pub ack: bool,
    /// Read data.
    pub dat: LaneWord,
}
