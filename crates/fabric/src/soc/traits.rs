//! Traits at the two seams of the fabric.
//!
//! This module defines what the router and bridge talk to. It provides:
//! 1. **Target:** Transaction-level endpoint with blocking, debug and direct-access paths.
//! 2. **HandshakeSlave:** Clocked endpoint on the bridge's signal-level interface.
//! 3. **Downcasting:** Optional casts to `Memory` for inspection by harnesses.
//!
//! Implementors must be `Send` so a whole fabric can be moved onto a worker thread.

use crate::common::{Result, SimTime, Transaction};
use crate::soc::bridge::signals::{MasterSignals, SlaveSignals};
use crate::soc::memory::Memory;
use crate::soc::memory::dmi::DmiHandle;

/// Transaction-level target bound to a router output or driven directly by an initiator.
pub trait Target: Send {
    /// Returns a short name for this target (e.g., `"memory0"`).
    fn name(&self) -> &str;

    /// Services `txn` on the protocol path, adding the access latency to `delay`.
    ///
    /// Returns `Err` for fatal conditions. Reported conditions set `txn.status` and return `Ok`.
    fn transport(&mut self, txn: &mut Transaction, delay: &mut SimTime) -> Result<()>;

    /// Services `txn` out of band, without timing, and returns the number of bytes moved.
    fn debug_transport(&mut self, _txn: &mut Transaction) -> usize {
        0
    }

    /// Requests a direct-access handle covering `address`.
    fn direct_access(&mut self, _address: u64) -> Option<DmiHandle> {
        None
    }

    /// Returns a reference as `Memory` if this target is a dense memory; otherwise `None`.
    fn as_memory(&self) -> Option<&Memory> {
        None
    }
}

/// Clocked slave on a bridge's request/acknowledge interface.
pub trait HandshakeSlave: Send {
    /// Returns a short name for this slave (e.g., `"RAM"`).
    fn name(&self) -> &str;

    /// Evaluates one rising clock edge.
    ///
    /// `inputs` are the master outputs settled at the previous edge. The returned outputs become
    /// visible to the master on the next edge.
    fn on_clock(&mut self, inputs: &MasterSignals) -> Result<SlaveSignals>;

    /// Drops any handshake in progress; called when the master aborts a transaction.
    fn reset(&mut self) {}
}
