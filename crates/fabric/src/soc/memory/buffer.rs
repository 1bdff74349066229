//! Shared byte storage for dense memories.
//!
//! This module provides the fixed-size array behind a [`Memory`](super::Memory). The buffer is
//! reference-counted so the protocol path and every direct-access handle operate on the same
//! bytes; there is no caching layer that could let them diverge.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Fixed-size, interior-mutable byte array.
#[derive(Debug)]
pub struct StoreBuffer {
    bytes: RwLock<Box<[u8]>>,
    size: usize,
}

impl StoreBuffer {
    /// Creates a zero-filled buffer of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: RwLock::new(vec![0u8; size].into_boxed_slice()),
            size,
        }
    }

    /// Creates a buffer of `size` bytes holding a copy of `data` at offset 0.
    ///
    /// Bytes of `data` beyond `size` are dropped.
    pub fn with_contents(size: usize, data: &[u8]) -> Self {
        let mut bytes = vec![0u8; size];
        let n = data.len().min(size);
        bytes[..n].copy_from_slice(&data[..n]);
        Self {
            bytes: RwLock::new(bytes.into_boxed_slice()),
            size,
        }
    }

    /// Returns the size of the buffer in bytes.
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` for a zero-sized buffer.
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    // A panic while holding the lock leaves plain bytes behind, which are still valid storage.
    fn read_guard(&self) -> RwLockReadGuard<'_, Box<[u8]>> {
        self.bytes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Box<[u8]>> {
        self.bytes.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copies `out.len()` bytes starting at `offset` into `out`.
    ///
    /// # Panics
    ///
    /// Panics if the range is outside the buffer.
    pub fn read_into(&self, offset: usize, out: &mut [u8]) {
        assert!(offset + out.len() <= self.size, "store read out of bounds");
        out.copy_from_slice(&self.read_guard()[offset..offset + out.len()]);
    }

    /// Returns a copy of `len` bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range is outside the buffer.
    pub fn read_slice(&self, offset: usize, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.read_into(offset, &mut out);
        out
    }

    /// Writes `data` starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range is outside the buffer.
    pub fn write_slice(&self, offset: usize, data: &[u8]) {
        assert!(offset + data.len() <= self.size, "store write out of bounds");
        self.write_guard()[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Writes the bytes of `data` whose `enabled` predicate holds, starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range is outside the buffer.
    pub fn write_masked(&self, offset: usize, data: &[u8], enabled: impl Fn(usize) -> bool) {
        assert!(offset + data.len() <= self.size, "store write out of bounds");
        let mut bytes = self.write_guard();
        for (i, byte) in data.iter().enumerate() {
            if enabled(i) {
                bytes[offset + i] = *byte;
            }
        }
    }

    /// Returns a copy of the whole buffer.
    pub fn snapshot(&self) -> Vec<u8> {
        self.read_guard().to_vec()
    }
}
