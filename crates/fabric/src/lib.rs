//! Memory-mapped bus fabric for transaction-level hardware simulation.
//!
//! This crate connects transaction initiators to memory targets with the following:
//! 1. **Router:** Address decode with post-decode masking, per-target counters and a CSV log.
//! 2. **Bridge:** Transaction-to-handshake conversion with burst splitting, byte masking and
//!    acknowledge timeouts.
//! 3. **Memories:** A dense store with protocol, debug and direct-access paths, and a sparse
//!    word store on the handshake interface.
//! 4. **Simulation:** An initiator, image loading and fabric construction from JSON.

/// Common types (payload, lanes, time, errors).
pub mod common;
/// Fabric configuration (defaults, enums, target and route descriptions).
pub mod config;
/// Initiator and image loader.
pub mod sim;
/// Fabric components (router, bridge, memories, devices, builder, traits).
pub mod soc;
/// Rotating transaction log.
pub mod trace;

/// Fabric-wide error type and result alias.
pub use crate::common::{FabricError, Result};
/// Transaction payload and its command and status.
pub use crate::common::{Command, ResponseStatus, SimTime, Transaction};
/// Root configuration type; use `FabricConfig::default()` or parse from JSON.
pub use crate::config::FabricConfig;
/// Top-level fabric; construct with `Fabric::from_config`.
pub use crate::soc::Fabric;
