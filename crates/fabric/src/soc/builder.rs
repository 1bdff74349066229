//! Fabric construction from configuration.
//!
//! This module builds a complete fabric from a [`FabricConfig`]. It performs:
//! 1. **Target setup:** Instantiates dense memories, bridged sparse stores and ROMs.
//! 2. **Image loading:** Preloads configured images into their memories.
//! 3. **Routing:** Binds the targets to a router in configuration order and installs their routes.
//! 4. **Logging:** Opens the rotating transaction log when one is configured.

use tracing::info;

use crate::common::{BusWidth, Result};
use crate::config::FabricConfig;
use crate::soc::bridge::WishboneBridge;
use crate::soc::devices::Rom;
use crate::soc::interconnect::{RouteEntry, Router};
use crate::soc::memory::Memory;
use crate::soc::memory::sparse::WordStore;
use crate::soc::traits::Target;
use crate::trace::TransactionLog;

/// Top-level fabric instance: a router with every configured target bound to it.
#[derive(Debug)]
pub struct Fabric {
    /// Interconnect owning every target.
    pub router: Router,
}

impl Fabric {
    /// Builds a fabric from configuration.
    ///
    /// Target indices follow configuration order: memories, then sparse stores, then ROMs.
    pub fn from_config(config: &FabricConfig) -> Result<Self> {
        let width = BusWidth::new(config.bus.width_bytes)?;
        let mut targets: Vec<Box<dyn Target>> = Vec::new();
        let mut routes = Vec::new();

        for mem_config in &config.memories {
            let memory = Memory::from_config(mem_config, &config.bus)?;
            if let Some(image) = &mem_config.image {
                let loaded = memory.load_image(&image.path, image.base_offset, image.endianness)?;
                info!(
                    memory = %mem_config.name,
                    bytes = loaded,
                    path = %image.path.display(),
                    "image loaded"
                );
            }
            targets.push(Box::new(memory));
            routes.push(RouteEntry::from(mem_config.route));
        }

        for sparse in &config.sparse {
            let store =
                WordStore::new(sparse.name.clone(), sparse.size_words).with_bus_width(width);
            let bridge =
                WishboneBridge::from_config(format!("{}_bridge", sparse.name), &config.bus, store)?;
            targets.push(Box::new(bridge));
            routes.push(RouteEntry::from(sparse.route));
        }

        for rom in &config.roms {
            targets.push(Box::new(Rom::from_config(rom)?));
            routes.push(RouteEntry::from(rom.route));
        }

        let mut router =
            Router::new("router", targets).with_overlap_policy(config.overlap_policy);
        if let Some(trace) = &config.trace {
            router = router.with_log(TransactionLog::from_config(trace)?);
        }
        for (index, entry) in routes.into_iter().enumerate() {
            router.set_route_entry(index, entry)?;
        }

        info!(targets = router.target_count(), "fabric built");
        Ok(Self { router })
    }

    /// Returns the router.
    pub const fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the router mutably.
    pub const fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }
}
