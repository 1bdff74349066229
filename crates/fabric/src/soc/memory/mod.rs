//! Backing-store targets.
//!
//! This module implements the memories the fabric routes to. It provides:
//! 1. **Buffer:** Shared byte storage (`StoreBuffer`) for dense memories.
//! 2. **Memory:** Bounds-checked dense target with fixed latency, debug and direct access.
//! 3. **DMI:** Direct-access handles sharing the memory's buffer.
//! 4. **Sparse:** Word-indexed store behind a handshake bridge, with read-modify-write lanes.

/// Shared byte storage.
pub mod buffer;

/// Direct memory interface handles.
pub mod dmi;

/// Sparse word store on the handshake interface.
pub mod sparse;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, warn};

use self::buffer::StoreBuffer;
use self::dmi::{DmiAccess, DmiHandle};
use crate::common::{
    BusWidth, Command, FabricError, ResponseStatus, Result, SimTime, Transaction,
};
use crate::config::{BusConfig, MemoryConfig};
use crate::sim::loader::{Endianness, load_binary, to_bus_order};
use crate::soc::traits::Target;

/// Default access latency of a dense memory.
pub const DEFAULT_LATENCY: SimTime = SimTime::ns(10);

/// Dense, bounds-checked memory target.
#[derive(Debug)]
pub struct Memory {
    name: String,
    buffer: Arc<StoreBuffer>,
    /// Bumped whenever the layout changes so stale direct-access handles can tell.
    generation: Arc<AtomicU64>,
    width: BusWidth,
    latency: SimTime,
    byte_enables: bool,
    read_ops: u64,
    write_ops: u64,
}

impl Memory {
    /// Creates a zeroed memory of `size` bytes on a 32-bit bus with the default latency.
    ///
    /// Byte enables are not supported until enabled with [`Memory::with_byte_enables`].
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            buffer: Arc::new(StoreBuffer::new(size)),
            generation: Arc::new(AtomicU64::new(0)),
            width: BusWidth::W32,
            latency: DEFAULT_LATENCY,
            byte_enables: false,
            read_ops: 0,
            write_ops: 0,
        }
    }

    /// Creates a memory from configuration.
    pub fn from_config(config: &MemoryConfig, bus: &BusConfig) -> Result<Self> {
        Ok(Self::new(config.name.clone(), config.size_bytes)
            .with_bus_width(BusWidth::new(bus.width_bytes)?)
            .with_latency(SimTime::ns(config.latency_ns))
            .with_byte_enables(config.byte_enables))
    }

    /// Sets the per-access latency.
    #[must_use]
    pub const fn with_latency(mut self, latency: SimTime) -> Self {
        self.latency = latency;
        self
    }

    /// Sets the bus width, which bounds the length of one access.
    #[must_use]
    pub const fn with_bus_width(mut self, width: BusWidth) -> Self {
        self.width = width;
        self
    }

    /// Enables or disables partial writes through byte enables.
    #[must_use]
    pub const fn with_byte_enables(mut self, supported: bool) -> Self {
        self.byte_enables = supported;
        self
    }

    /// Returns the size in bytes.
    pub fn size(&self) -> u64 {
        self.buffer.len() as u64
    }

    /// Returns the per-access latency.
    pub const fn latency(&self) -> SimTime {
        self.latency
    }

    /// Returns the bus width.
    pub const fn bus_width(&self) -> BusWidth {
        self.width
    }

    /// Returns the number of protocol-path reads serviced.
    pub const fn read_ops(&self) -> u64 {
        self.read_ops
    }

    /// Returns the number of protocol-path writes serviced.
    pub const fn write_ops(&self) -> u64 {
        self.write_ops
    }

    fn check_range(&self, address: u64, length: u64) -> Result<()> {
        let size = self.size();
        match address.checked_add(length) {
            Some(end) if end <= size => Ok(()),
            _ => Err(FabricError::AddressOutOfRange {
                address,
                length,
                size,
            }),
        }
    }

    /// Reads `length` bytes at `address`, failing if the range leaves the store.
    pub fn read(&self, address: u64, length: usize) -> Result<Vec<u8>> {
        self.check_range(address, length as u64)?;
        Ok(self.buffer.read_slice(address as usize, length))
    }

    /// Writes `data` at `address`, applying only enabled lanes when `byte_enable` is given.
    ///
    /// Enables shorter than `data` repeat cyclically; a non-zero byte enables its lane.
    pub fn write(&self, address: u64, data: &[u8], byte_enable: Option<&[u8]>) -> Result<()> {
        self.check_range(address, data.len() as u64)?;
        match byte_enable {
            Some(enables) if !enables.is_empty() => {
                self.buffer.write_masked(address as usize, data, |i| {
                    enables[i % enables.len()] != 0
                });
            }
            _ => self.buffer.write_slice(address as usize, data),
        }
        Ok(())
    }

    /// Copies an image into the store at `offset`, reordering words per `endianness`.
    ///
    /// Images that run past the end of the store are clipped. Returns the number of bytes
    /// written.
    pub fn load_bytes(&self, image: &[u8], offset: u64, endianness: Endianness) -> usize {
        let ordered = to_bus_order(image, self.width, endianness);
        let size = self.size();
        if offset >= size {
            warn!(memory = %self.name, offset, size, "image starts past the end of the store");
            return 0;
        }
        let n = ordered.len().min((size - offset) as usize);
        if n < ordered.len() {
            warn!(
                memory = %self.name,
                offset,
                image = ordered.len(),
                written = n,
                "image clipped at the end of the store"
            );
        }
        self.buffer.write_slice(offset as usize, &ordered[..n]);
        n
    }

    /// Reads an image file and loads it at `offset`.
    pub fn load_image(
        &self,
        path: impl AsRef<Path>,
        offset: u64,
        endianness: Endianness,
    ) -> Result<usize> {
        let image = load_binary(path)?;
        Ok(self.load_bytes(&image, offset, endianness))
    }

    /// Changes the size of the store, keeping the common prefix of its contents.
    ///
    /// Every direct-access handle granted before the resize becomes invalid.
    pub fn resize(&mut self, size: usize) {
        let contents = self.buffer.snapshot();
        self.buffer = Arc::new(StoreBuffer::with_contents(size, &contents));
        let previous = self.generation.fetch_add(1, Ordering::AcqRel);
        debug!(memory = %self.name, size, generation = previous + 1, "store resized");
    }

    /// Validates a protocol-path access, returning the status to report if it is rejected.
    fn reject(&self, txn: &Transaction) -> Option<ResponseStatus> {
        if txn.byte_enable.is_some() && !self.byte_enables {
            return Some(ResponseStatus::ByteEnableError);
        }
        if txn.length > self.width.bytes()
            || txn.streaming_width < txn.length
            || txn.data.len() < txn.length as usize
        {
            return Some(ResponseStatus::BurstError);
        }
        None
    }
}

impl Target for Memory {
    fn name(&self) -> &str {
        &self.name
    }

    fn transport(&mut self, txn: &mut Transaction, delay: &mut SimTime) -> Result<()> {
        if txn.command == Command::Ignore {
            txn.status = ResponseStatus::CommandError;
            return Ok(());
        }

        if let Err(e) = self.check_range(txn.address, u64::from(txn.length)) {
            error!(
                memory = %self.name,
                address = txn.address,
                length = txn.length,
                "access out of range"
            );
            txn.status = ResponseStatus::AddressError;
            return Err(e);
        }

        if let Some(status) = self.reject(txn) {
            debug!(memory = %self.name, address = txn.address, %status, "transaction rejected");
            txn.status = status;
            return Ok(());
        }

        let address = txn.address as usize;
        let length = txn.length as usize;
        if txn.command == Command::Read {
            self.buffer.read_into(address, &mut txn.data[..length]);
            self.read_ops += 1;
        } else {
            let data = &txn.data[..length];
            if txn.byte_enable.is_some() {
                self.buffer.write_masked(address, data, |i| txn.byte_enabled(i));
            } else {
                self.buffer.write_slice(address, data);
            }
            self.write_ops += 1;
        }

        // Temporal decoupling: the access is instantaneous, the latency is annotated.
        *delay += self.latency;

        txn.dmi_allowed = true;
        txn.status = ResponseStatus::Ok;
        Ok(())
    }

    fn debug_transport(&mut self, txn: &mut Transaction) -> usize {
        let size = self.size();
        if txn.address >= size {
            return 0;
        }
        let requested = (txn.length as usize).min(txn.data.len());
        let num_bytes = requested.min((size - txn.address) as usize);
        let address = txn.address as usize;
        match txn.command {
            Command::Read => self.buffer.read_into(address, &mut txn.data[..num_bytes]),
            Command::Write => self.buffer.write_slice(address, &txn.data[..num_bytes]),
            Command::Ignore => return 0,
        }
        num_bytes
    }

    fn direct_access(&mut self, address: u64) -> Option<DmiHandle> {
        let size = self.size();
        if address >= size {
            return None;
        }
        Some(DmiHandle::new(
            Arc::clone(&self.buffer),
            Arc::clone(&self.generation),
            0,
            size - 1,
            self.latency,
            DmiAccess::ReadWrite,
        ))
    }

    fn as_memory(&self) -> Option<&Memory> {
        Some(self)
    }
}
