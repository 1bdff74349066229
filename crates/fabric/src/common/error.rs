//! Fabric error definitions.
//!
//! This module defines the single error type returned by every fabric component. It provides:
//! 1. **Fatal conditions:** Decode failures, protocol timeouts and bus faults that abort the run.
//! 2. **Reported conditions:** Error response statuses surfaced to initiators that check them.
//! 3. **Configuration errors:** Route table, bus width, JSON and I/O failures during setup.

use std::path::PathBuf;

use thiserror::Error;

use super::payload::{Command, ResponseStatus};

/// Result alias used throughout the fabric.
pub type Result<T> = std::result::Result<T, FabricError>;

/// Errors raised by the router, bridge, stores and their configuration.
///
/// Everything returned as `Err` is fatal for the simulation run: the fabric models hardware
/// bus-error semantics for verification, so callers stop simulating rather than retry.
/// Conditions that are only *reported* travel in [`ResponseStatus`] instead and become
/// [`FabricError::Response`] once an initiator checks them.
#[derive(Debug, Error)]
pub enum FabricError {
    /// No configured route covers the address.
    #[error("address {address:#x} does not match any defined subspace")]
    AddressDecode {
        /// Address as issued by the initiator.
        address: u64,
    },

    /// The command is neither a read nor a write.
    #[error("received an unsupported command: {command}")]
    UnsupportedCommand {
        /// The rejected command.
        command: Command,
    },

    /// The handshake slave did not acknowledge a beat within the timeout.
    #[error("acknowledge not received after {cycles} wait cycles (beat at {address:#x})")]
    ProtocolTimeout {
        /// Wait cycles elapsed when the timeout fired.
        cycles: u32,
        /// Byte address of the beat that was never acknowledged.
        address: u64,
    },

    /// A protocol-path access runs past the end of a store.
    #[error("access of {length} bytes at {address:#x} is outside the store (size {size:#x})")]
    AddressOutOfRange {
        /// Target-local byte address.
        address: u64,
        /// Bytes requested.
        length: u64,
        /// Store size in bytes.
        size: u64,
    },

    /// A handshake slave was addressed past its last word.
    #[error("out of bound access to word {index:#x} of {device} (size {size:#x} words)")]
    BusFault {
        /// Name of the faulting slave.
        device: String,
        /// Word index presented on the address lines.
        index: u64,
        /// Configured size in words.
        size: u64,
    },

    /// A write reached a read-only target.
    #[error("write to read-only target {device} at {address:#x}")]
    WriteToReadOnly {
        /// Name of the target.
        device: String,
        /// Target-local byte address.
        address: u64,
    },

    /// A transaction was submitted while the bridge still had one in flight.
    #[error("bridge {bridge} already has a transaction in flight")]
    BridgeBusy {
        /// Name of the bridge.
        bridge: String,
    },

    /// An initiator checked a completed transaction and found an error status.
    #[error("transaction at {address:#x} completed with {status}")]
    Response {
        /// Status returned by the target.
        status: ResponseStatus,
        /// Address the initiator issued.
        address: u64,
    },

    /// A direct-access handle outlived the layout it was granted for.
    #[error("direct memory handle for [{start:#x}, {end:#x}] was invalidated")]
    DmiInvalidated {
        /// First byte covered by the stale handle.
        start: u64,
        /// Last byte covered by the stale handle.
        end: u64,
    },

    /// A direct-access request falls outside the granted window.
    #[error("direct access at {address:#x} outside granted window [{start:#x}, {end:#x}]")]
    DmiOutOfWindow {
        /// Requested byte address.
        address: u64,
        /// First byte of the window.
        start: u64,
        /// Last byte of the window.
        end: u64,
    },

    /// A direct write through a read-only grant.
    #[error("direct write at {address:#x} through a read-only grant")]
    DmiReadOnly {
        /// Requested byte address.
        address: u64,
    },

    /// A route entry with an empty or inverted range.
    #[error("route {index} has an empty range [{base:#x}, {top:#x})")]
    InvalidRoute {
        /// Target index being configured.
        index: usize,
        /// Configured base address.
        base: u64,
        /// Configured top address (exclusive).
        top: u64,
    },

    /// Two route entries cover a common address.
    #[error("route {index} overlaps route {other}")]
    RouteOverlap {
        /// Target index being configured.
        index: usize,
        /// Already configured target index it collides with.
        other: usize,
    },

    /// The router has no target at this index.
    #[error("target index {index} out of range ({count} targets)")]
    InvalidTargetIndex {
        /// Requested index.
        index: usize,
        /// Number of bound targets.
        count: usize,
    },

    /// Route configuration attempted after the first routed transaction.
    #[error("router {router} is already routing; routes are fixed")]
    RouterSealed {
        /// Name of the router.
        router: String,
    },

    /// Bus width outside the supported set.
    #[error("unsupported bus width of {0} bytes (expected 1, 2, 4 or 8)")]
    InvalidBusWidth(u32),

    /// Malformed configuration or script.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// File access failed while loading an image or writing a log.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl FabricError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
