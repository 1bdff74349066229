//! Transaction initiator.
//!
//! An [`Initiator`] builds transactions with the mandatory initial values (status
//! `Incomplete`, no direct-access hint), sends them through any [`Target`] and checks the
//! response status afterwards, turning error statuses into [`FabricError::Response`].

use tracing::{debug, error};

use crate::common::{BusWidth, FabricError, Result, SimTime, Transaction};
use crate::soc::traits::Target;

/// Issues reads and writes of one bus word per beat.
#[derive(Debug)]
pub struct Initiator {
    name: String,
    width: BusWidth,
    issued: u64,
}

impl Initiator {
    /// Creates an initiator for a 32-bit bus.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: BusWidth::W32,
            issued: 0,
        }
    }

    /// Sets the bus width, which is also the per-beat transaction length.
    #[must_use]
    pub const fn with_bus_width(mut self, width: BusWidth) -> Self {
        self.width = width;
        self
    }

    /// Returns the initiator name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of transactions issued.
    pub const fn issued(&self) -> u64 {
        self.issued
    }

    /// Writes `data` at `address` as `streaming_width` bytes of beats.
    ///
    /// A streaming width of 0 is passed through; bridges treat it as a single beat. Returns the
    /// delay annotated by the fabric.
    pub fn write(
        &mut self,
        target: &mut dyn Target,
        address: u64,
        data: &[u8],
        streaming_width: u32,
        byte_enable: Option<&[u8]>,
    ) -> Result<SimTime> {
        let mut txn = Transaction::write(address, data.to_vec())
            .with_length(self.width.bytes())
            .with_streaming_width(streaming_width);
        txn.byte_enable = byte_enable.map(<[u8]>::to_vec);
        self.issue(target, &mut txn)
    }

    /// Reads `buffer.len()` bytes at `address` as `streaming_width` bytes of beats.
    pub fn read(
        &mut self,
        target: &mut dyn Target,
        address: u64,
        buffer: &mut [u8],
        streaming_width: u32,
    ) -> Result<SimTime> {
        let mut txn = Transaction::read(address, self.width.bytes())
            .with_length(self.width.bytes())
            .with_streaming_width(streaming_width);
        if txn.data.len() < buffer.len() {
            txn.data.resize(buffer.len(), 0);
        }
        let delay = self.issue(target, &mut txn)?;
        let n = buffer.len().min(txn.data.len());
        buffer[..n].copy_from_slice(&txn.data[..n]);
        Ok(delay)
    }

    /// Writes one little-endian 32-bit word.
    pub fn write_word(
        &mut self,
        target: &mut dyn Target,
        address: u64,
        value: u32,
    ) -> Result<SimTime> {
        self.write(target, address, &value.to_le_bytes(), 4, None)
    }

    /// Reads one little-endian 32-bit word.
    pub fn read_word(&mut self, target: &mut dyn Target, address: u64) -> Result<u32> {
        let mut bytes = [0u8; 4];
        let _ = self.read(target, address, &mut bytes, 4)?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn issue(&mut self, target: &mut dyn Target, txn: &mut Transaction) -> Result<SimTime> {
        let address = txn.address;
        let mut delay = SimTime::ZERO;
        self.issued += 1;
        debug!(
            initiator = %self.name,
            target = target.name(),
            command = %txn.command,
            address,
            width = txn.streaming_width,
            "issuing transaction"
        );
        target.transport(txn, &mut delay)?;

        if txn.is_response_error() {
            error!(initiator = %self.name, address, status = %txn.status, "transaction failed");
            return Err(FabricError::Response {
                status: txn.status,
                address,
            });
        }
        Ok(delay)
    }
}
