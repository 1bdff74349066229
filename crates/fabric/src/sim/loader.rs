//! Image loading.
//!
//! This module reads raw memory images from disk and reorders them for the bus. It performs:
//! 1. **Binary loading:** Reads an image file into a byte buffer, reporting the path on failure.
//! 2. **Word ordering:** Converts big-endian images into the fabric's little-endian lane order,
//!    one bus word at a time.

use std::fs;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::Deserialize;

use crate::common::{BusWidth, FabricError, Result};

/// Byte order of the words stored in an image file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Words are stored least significant byte first; copied verbatim.
    #[default]
    Little,
    /// Words are stored most significant byte first; each bus word is swapped.
    Big,
}

/// Loads a binary file from disk into a byte vector.
pub fn load_binary(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| FabricError::io(path, e))
}

/// Returns `image` in bus lane order for a bus of `width`.
///
/// Big-endian images are swapped word by word; a trailing partial word is zero-padded first,
/// so the result may be longer than the input.
pub fn to_bus_order(image: &[u8], width: BusWidth, endianness: Endianness) -> Vec<u8> {
    if endianness == Endianness::Little || width.bytes() == 1 {
        return image.to_vec();
    }

    let word = width.lanes();
    let mut out = Vec::with_capacity(image.len().div_ceil(word) * word);
    for chunk in image.chunks(word) {
        let mut padded = [0u8; 8];
        padded[..chunk.len()].copy_from_slice(chunk);
        let mut swapped = [0u8; 8];
        match word {
            2 => LittleEndian::write_u16(&mut swapped, BigEndian::read_u16(&padded)),
            4 => LittleEndian::write_u32(&mut swapped, BigEndian::read_u32(&padded)),
            _ => LittleEndian::write_u64(&mut swapped, BigEndian::read_u64(&padded)),
        }
        out.extend_from_slice(&swapped[..word]);
    }
    out
}
