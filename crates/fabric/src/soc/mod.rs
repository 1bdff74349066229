//! Fabric components.
//!
//! This module organizes the components that make up a fabric: the router, the protocol
//! bridge, the memories and fixed-function devices, and the builder that assembles them from
//! configuration.

/// Transaction-to-handshake protocol bridge.
pub mod bridge;

/// Fabric builder.
pub mod builder;

/// Fixed-function targets.
pub mod devices;

/// Address-decoding router.
pub mod interconnect;

/// Dense and sparse memories.
pub mod memory;

/// Traits implemented by targets and handshake slaves.
pub mod traits;

pub use builder::Fabric;
