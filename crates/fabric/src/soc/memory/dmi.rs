//! Direct memory interface (fast-path) handles.
//!
//! A [`DmiHandle`] is the capability a dense memory hands to an initiator so it can read and
//! write the backing array without going through the protocol path. The handle shares the
//! memory's [`StoreBuffer`], so direct and protocol accesses always observe each other. Each
//! handle remembers the layout generation it was granted under and refuses to operate once the
//! memory is resized.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::buffer::StoreBuffer;
use crate::common::{FabricError, Result, SimTime};

/// Access rights granted with a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmiAccess {
    /// Reads only.
    Read,
    /// Reads and writes.
    ReadWrite,
}

/// Direct-access grant over a window of a dense memory.
#[derive(Clone, Debug)]
pub struct DmiHandle {
    buffer: Arc<StoreBuffer>,
    generation: Arc<AtomicU64>,
    granted: u64,
    start: u64,
    end: u64,
    read_latency: SimTime,
    write_latency: SimTime,
    access: DmiAccess,
}

impl DmiHandle {
    pub(crate) fn new(
        buffer: Arc<StoreBuffer>,
        generation: Arc<AtomicU64>,
        start: u64,
        end: u64,
        latency: SimTime,
        access: DmiAccess,
    ) -> Self {
        let granted = generation.load(Ordering::Acquire);
        Self {
            buffer,
            generation,
            granted,
            start,
            end,
            read_latency: latency,
            write_latency: latency,
            access,
        }
    }

    /// First byte address covered by the grant.
    pub const fn start_address(&self) -> u64 {
        self.start
    }

    /// Last byte address covered by the grant (inclusive).
    pub const fn end_address(&self) -> u64 {
        self.end
    }

    /// Latency to annotate per direct read.
    pub const fn read_latency(&self) -> SimTime {
        self.read_latency
    }

    /// Latency to annotate per direct write.
    pub const fn write_latency(&self) -> SimTime {
        self.write_latency
    }

    /// Granted access rights.
    pub const fn access(&self) -> DmiAccess {
        self.access
    }

    /// Returns `false` once the memory's layout changed after the grant.
    pub fn is_valid(&self) -> bool {
        self.generation.load(Ordering::Acquire) == self.granted
    }

    /// Returns `true` if `[address, address + len)` lies inside the window.
    pub const fn covers(&self, address: u64, len: u64) -> bool {
        if len == 0 {
            return address >= self.start && address <= self.end;
        }
        match address.checked_add(len - 1) {
            Some(last) => address >= self.start && last <= self.end,
            None => false,
        }
    }

    /// Reads `out.len()` bytes at `address`, returning the latency to annotate.
    pub fn read(&self, address: u64, out: &mut [u8]) -> Result<SimTime> {
        self.check(address, out.len() as u64)?;
        self.buffer.read_into((address - self.start) as usize, out);
        Ok(self.read_latency)
    }

    /// Writes `data` at `address`, returning the latency to annotate.
    pub fn write(&self, address: u64, data: &[u8]) -> Result<SimTime> {
        self.check(address, data.len() as u64)?;
        if self.access == DmiAccess::Read {
            return Err(FabricError::DmiReadOnly { address });
        }
        self.buffer.write_slice((address - self.start) as usize, data);
        Ok(self.write_latency)
    }

    fn check(&self, address: u64, len: u64) -> Result<()> {
        if !self.is_valid() {
            return Err(FabricError::DmiInvalidated {
                start: self.start,
                end: self.end,
            });
        }
        if !self.covers(address, len) {
            return Err(FabricError::DmiOutOfWindow {
                address,
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}
