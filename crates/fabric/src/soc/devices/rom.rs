//! Read-only image target.
//!
//! A [`Rom`] serves reads from an immutable byte image. Incoming addresses are made local by
//! subtracting the configured base address; writes are fatal. Initiators may read the image
//! directly through a read-only [`DmiHandle`] whose window starts at the base address.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use tracing::{debug, error, info};

use crate::common::{Command, FabricError, ResponseStatus, Result, SimTime, Transaction};
use crate::config::RomConfig;
use crate::sim::loader::load_binary;
use crate::soc::memory::buffer::StoreBuffer;
use crate::soc::memory::dmi::{DmiAccess, DmiHandle};
use crate::soc::traits::Target;

/// Read-only memory holding a fixed image.
#[derive(Debug)]
pub struct Rom {
    name: String,
    base_address: u64,
    image: Arc<StoreBuffer>,
    // Never bumped: the image cannot be resized.
    generation: Arc<AtomicU64>,
    latency: SimTime,
}

impl Rom {
    /// Creates a ROM serving `image`, mapped so that `base_address` is its first byte.
    pub fn new(name: impl Into<String>, base_address: u64, image: &[u8]) -> Self {
        Self {
            name: name.into(),
            base_address,
            image: Arc::new(StoreBuffer::with_contents(image.len(), image)),
            generation: Arc::new(AtomicU64::new(0)),
            latency: SimTime::ZERO,
        }
    }

    /// Creates a ROM from an image file.
    pub fn from_file(
        name: impl Into<String>,
        base_address: u64,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let name = name.into();
        let image = load_binary(path)?;
        info!(rom = %name, bytes = image.len(), "initialised the ROM");
        Ok(Self::new(name, base_address, &image))
    }

    /// Creates a ROM from configuration.
    pub fn from_config(config: &RomConfig) -> Result<Self> {
        Self::from_file(config.name.clone(), config.base_address, &config.path)
    }

    /// Sets the latency annotated per read.
    #[must_use]
    pub const fn with_latency(mut self, latency: SimTime) -> Self {
        self.latency = latency;
        self
    }

    /// Returns the image size in bytes.
    pub fn size(&self) -> u64 {
        self.image.len() as u64
    }

    /// Returns a copy of the image.
    pub fn image(&self) -> Vec<u8> {
        self.image.snapshot()
    }

    fn local(&self, address: u64) -> Option<u64> {
        address.checked_sub(self.base_address)
    }
}

impl Target for Rom {
    fn name(&self) -> &str {
        &self.name
    }

    fn transport(&mut self, txn: &mut Transaction, delay: &mut SimTime) -> Result<()> {
        debug!(
            rom = %self.name,
            address = txn.address,
            length = txn.length,
            command = %txn.command,
            "transaction received"
        );

        let size = self.size();
        let length = u64::from(txn.length);
        let local = self
            .local(txn.address)
            .filter(|a| a.checked_add(length).is_some_and(|end| end <= size));
        let Some(local) = local else {
            error!(rom = %self.name, address = txn.address, size, "address is outside the image");
            txn.status = ResponseStatus::AddressError;
            return Err(FabricError::AddressOutOfRange {
                address: txn.address.wrapping_sub(self.base_address),
                length,
                size,
            });
        };

        match txn.command {
            Command::Read => {
                if txn.data.len() < txn.length as usize {
                    txn.status = ResponseStatus::BurstError;
                    return Ok(());
                }
                self.image
                    .read_into(local as usize, &mut txn.data[..txn.length as usize]);
            }
            Command::Write => {
                error!(rom = %self.name, address = txn.address, "write not allowed on ROMs");
                txn.status = ResponseStatus::CommandError;
                return Err(FabricError::WriteToReadOnly {
                    device: self.name.clone(),
                    address: local,
                });
            }
            Command::Ignore => {
                txn.status = ResponseStatus::CommandError;
                return Ok(());
            }
        }

        *delay += self.latency;
        txn.status = ResponseStatus::Ok;
        Ok(())
    }

    fn debug_transport(&mut self, txn: &mut Transaction) -> usize {
        if txn.command != Command::Read {
            return 0;
        }
        let Some(local) = self.local(txn.address) else {
            return 0;
        };
        let size = self.size();
        if local >= size {
            return 0;
        }
        let n = (txn.length as usize)
            .min(txn.data.len())
            .min((size - local) as usize);
        self.image.read_into(local as usize, &mut txn.data[..n]);
        n
    }

    fn direct_access(&mut self, address: u64) -> Option<DmiHandle> {
        let size = self.size();
        if self.local(address)? >= size {
            return None;
        }
        debug!(rom = %self.name, address, "granted read-only direct access");
        Some(DmiHandle::new(
            Arc::clone(&self.image),
            Arc::clone(&self.generation),
            self.base_address,
            self.base_address.saturating_add(size - 1),
            self.latency,
            DmiAccess::Read,
        ))
    }
}
