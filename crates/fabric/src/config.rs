//! Configuration system for the bus fabric.
//!
//! This module defines the structures used to describe a fabric before it is built. It provides:
//! 1. **Defaults:** Baseline bus, memory and log constants.
//! 2. **Structures:** Bus parameters, per-target descriptions with their route entries, and
//!    the optional transaction log.
//! 3. **Enums:** Route overlap policy and image endianness.
//!
//! Configuration is supplied as JSON (see [`FabricConfig::from_json`]) or built in code starting
//! from `FabricConfig::default()`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::{FabricError, Result};
pub use crate::sim::loader::Endianness;

/// Default configuration constants for the fabric.
mod defaults {
    /// Data bus width in bytes (32-bit bus).
    pub const BUS_WIDTH: u32 = 4;

    /// Period of one bridge clock edge in nanoseconds.
    pub const CLOCK_PERIOD_NS: u64 = 1;

    /// Wait cycles a bridge allows before declaring a protocol timeout.
    pub const ACK_TIMEOUT: u32 = 10;

    /// Access latency of a dense memory in nanoseconds.
    pub const MEMORY_LATENCY_NS: u64 = 10;

    /// Size of a sparse word store in words.
    pub const SPARSE_SIZE_WORDS: u64 = 0x100;

    /// Post-decode mask that leaves addresses unchanged.
    pub const ROUTE_MASK: u64 = u64::MAX;

    /// Size at which the transaction log rotates (128 MiB).
    pub const TRACE_MAX_BYTES: u64 = 128 * 1024 * 1024;

    /// Number of transaction log files kept, including the active one.
    pub const TRACE_MAX_FILES: usize = 3;
}

/// How the router treats route entries that cover a common address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Overlapping entries are a configuration error.
    #[default]
    Reject,
    /// Overlaps are accepted; the lowest target index wins at decode time.
    FirstMatch,
}

/// Root configuration structure describing a complete fabric.
///
/// Targets are bound to router indices in order: every entry of `memories`, then `sparse`, then
/// `roms`.
///
/// # Examples
///
/// ```
/// use busfab_core::config::FabricConfig;
///
/// let json = r#"{
///     "bus": { "width_bytes": 4, "ack_timeout": 20 },
///     "memories": [
///         { "name": "ram", "size_bytes": 4096, "route": { "base": 0, "top": 4096 } }
///     ]
/// }"#;
///
/// let config = FabricConfig::from_json(json).unwrap();
/// assert_eq!(config.bus.ack_timeout, 20);
/// assert_eq!(config.memories[0].latency_ns, 10);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FabricConfig {
    /// Bus parameters shared by every target.
    #[serde(default)]
    pub bus: BusConfig,
    /// Dense memories.
    #[serde(default)]
    pub memories: Vec<MemoryConfig>,
    /// Sparse word stores, each reached through its own handshake bridge.
    #[serde(default)]
    pub sparse: Vec<SparseConfig>,
    /// Read-only images.
    #[serde(default)]
    pub roms: Vec<RomConfig>,
    /// Treatment of overlapping route entries.
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,
    /// Transaction log; disabled when absent.
    #[serde(default)]
    pub trace: Option<TraceConfig>,
}

impl FabricConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| FabricError::io(path, e))?;
        Self::from_json(&text)
    }
}

/// Bus parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Data bus width in bytes (1, 2, 4 or 8).
    #[serde(default = "BusConfig::default_width_bytes")]
    pub width_bytes: u32,
    /// Period of one bridge clock edge in nanoseconds.
    #[serde(default = "BusConfig::default_clock_period_ns")]
    pub clock_period_ns: u64,
    /// Wait cycles before a bridge declares a protocol timeout.
    #[serde(default = "BusConfig::default_ack_timeout")]
    pub ack_timeout: u32,
}

impl BusConfig {
    fn default_width_bytes() -> u32 {
        defaults::BUS_WIDTH
    }

    fn default_clock_period_ns() -> u64 {
        defaults::CLOCK_PERIOD_NS
    }

    fn default_ack_timeout() -> u32 {
        defaults::ACK_TIMEOUT
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            width_bytes: defaults::BUS_WIDTH,
            clock_period_ns: defaults::CLOCK_PERIOD_NS,
            ack_timeout: defaults::ACK_TIMEOUT,
        }
    }
}

/// One route entry: `[base, top)` decoded to a target, with `address & mask` forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RouteConfig {
    /// First address of the range.
    pub base: u64,
    /// First address past the range.
    pub top: u64,
    /// Post-decode mask; defaults to all ones (no rewrite).
    #[serde(default = "RouteConfig::default_mask")]
    pub mask: u64,
}

impl RouteConfig {
    fn default_mask() -> u64 {
        defaults::ROUTE_MASK
    }
}

/// Dense memory target.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Target name used in logs and errors.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: usize,
    /// Access latency in nanoseconds.
    #[serde(default = "MemoryConfig::default_latency_ns")]
    pub latency_ns: u64,
    /// Accept transactions carrying byte enables.
    #[serde(default)]
    pub byte_enables: bool,
    /// Image loaded into the memory at build time.
    #[serde(default)]
    pub image: Option<ImageConfig>,
    /// Route entry for this memory.
    pub route: RouteConfig,
}

impl MemoryConfig {
    fn default_latency_ns() -> u64 {
        defaults::MEMORY_LATENCY_NS
    }
}

/// Image file to preload.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    /// Path of the raw image.
    pub path: PathBuf,
    /// Byte offset inside the memory where the image starts.
    #[serde(default)]
    pub base_offset: u64,
    /// Word order of the image file.
    #[serde(default)]
    pub endianness: Endianness,
}

/// Sparse word store behind a handshake bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct SparseConfig {
    /// Name of the store; the bridge is named after it.
    pub name: String,
    /// Size in words.
    #[serde(default = "SparseConfig::default_size_words")]
    pub size_words: u64,
    /// Route entry for the bridge.
    pub route: RouteConfig,
}

impl SparseConfig {
    fn default_size_words() -> u64 {
        defaults::SPARSE_SIZE_WORDS
    }
}

/// Read-only image target.
#[derive(Debug, Clone, Deserialize)]
pub struct RomConfig {
    /// Target name.
    pub name: String,
    /// Path of the raw image.
    pub path: PathBuf,
    /// Address subtracted from every incoming (post-mask) address.
    #[serde(default)]
    pub base_address: u64,
    /// Route entry for the ROM.
    pub route: RouteConfig,
}

/// Rotating CSV transaction log.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceConfig {
    /// Path of the active log file; rotated files get `.1`, `.2`, ... appended.
    pub path: PathBuf,
    /// Size at which the active file is rotated.
    #[serde(default = "TraceConfig::default_max_bytes")]
    pub max_bytes: u64,
    /// Number of files kept, including the active one.
    #[serde(default = "TraceConfig::default_max_files")]
    pub max_files: usize,
}

impl TraceConfig {
    fn default_max_bytes() -> u64 {
        defaults::TRACE_MAX_BYTES
    }

    fn default_max_files() -> usize {
        defaults::TRACE_MAX_FILES
    }
}
