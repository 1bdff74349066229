//! Simulation utilities.
//!
//! Provides the initiator that drives transactions into a fabric and the loader that reads
//! memory images from disk.

/// Transaction-issuing initiator.
pub mod initiator;

/// Image loading and word ordering.
pub mod loader;

pub use initiator::Initiator;
pub use loader::Endianness;
