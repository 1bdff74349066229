//! Common types used throughout the bus fabric.
//!
//! This module provides the building blocks shared by every component. It includes:
//! 1. **Payload:** The transaction passed from initiators to targets, with command and status.
//! 2. **Lanes:** Bus width and per-lane data words for the handshake interface.
//! 3. **Time:** Simulated time used for latency annotation.
//! 4. **Error Handling:** The fabric-wide error type and `Result` alias.

/// Error types for fatal and configuration failures.
pub mod error;

/// Bus width and lane-aware data words.
pub mod lanes;

/// Transaction payload, command and response status.
pub mod payload;

/// Simulated time.
pub mod time;

pub use error::{FabricError, Result};
pub use lanes::{BusWidth, LaneWord};
pub use payload::{BYTE_DISABLED, BYTE_ENABLED, Command, ResponseStatus, Transaction};
pub use time::SimTime;
