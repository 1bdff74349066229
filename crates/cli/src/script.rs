//! Transaction scripts replayed by `busfab run`.
//!
//! A script is a JSON array of steps. Each step names its operation in `op`:
//!
//! ```json
//! [
//!     { "op": "write", "address": 4096, "data": 3405691582 },
//!     { "op": "read", "address": 4096, "expect": 3405691582, "initiator": 1 },
//!     { "op": "peek", "address": 16 }
//! ]
//! ```

use std::path::Path;

use busfab_core::common::{FabricError, Result, Transaction};
use busfab_core::sim::Initiator;
use busfab_core::soc::interconnect::Router;
use serde::Deserialize;
use tracing::{info, warn};

/// One scripted access.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Step {
    /// Write one 32-bit word through the protocol path.
    Write {
        address: u64,
        data: u32,
        #[serde(default)]
        initiator: usize,
    },
    /// Read one 32-bit word through the protocol path, optionally checking it.
    Read {
        address: u64,
        #[serde(default)]
        expect: Option<u32>,
        #[serde(default)]
        initiator: usize,
    },
    /// Read one word through the debug path; no time passes and nothing is logged.
    Peek { address: u64 },
}

/// Outcome of a replayed script.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub steps: usize,
    pub mismatches: usize,
}

/// Parses a script from JSON text.
pub fn parse(json: &str) -> Result<Vec<Step>> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses a script file.
pub fn load(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path).map_err(|e| FabricError::io(path, e))?;
    parse(&text)
}

/// Replays `steps` against `router`, stopping at the first fatal error.
pub fn replay(router: &mut Router, steps: &[Step]) -> Result<Summary> {
    let mut initiator = Initiator::new("script");
    let mut summary = Summary::default();

    for step in steps {
        match *step {
            Step::Write {
                address,
                data,
                initiator: id,
            } => {
                let delay = initiator.write_word(&mut router.port(id), address, data)?;
                println!("write {address:#010x} <- {data:#010x}  (+{delay})");
            }
            Step::Read {
                address,
                expect,
                initiator: id,
            } => {
                let value = initiator.read_word(&mut router.port(id), address)?;
                match expect {
                    Some(expected) if expected != value => {
                        summary.mismatches += 1;
                        warn!(address, value, expected, "read mismatch");
                        println!(
                            "read  {address:#010x} -> {value:#010x}  MISMATCH \
                             (expected {expected:#010x})"
                        );
                    }
                    _ => println!("read  {address:#010x} -> {value:#010x}"),
                }
            }
            Step::Peek { address } => {
                let mut txn = Transaction::read(address, 4);
                let moved = router.debug_route(&mut txn)?;
                let mut word = [0u8; 4];
                word[..moved].copy_from_slice(&txn.data[..moved]);
                println!(
                    "peek  {address:#010x} -> {:#010x}  ({moved} bytes)",
                    u32::from_le_bytes(word)
                );
            }
        }
        summary.steps += 1;
    }

    info!(steps = summary.steps, mismatches = summary.mismatches, "script finished");
    Ok(summary)
}
