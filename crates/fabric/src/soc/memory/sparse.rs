//! Sparse word-indexed RAM on the handshake interface.
//!
//! Only written words occupy space. A location that was never written reads back as
//! [`LaneWord::UNDEFINED`], and a partial write keeps the lanes it does not select (unknown
//! lanes stay unknown).

use std::collections::BTreeMap;

use tracing::{error, trace};

use crate::common::{BusWidth, FabricError, LaneWord, Result};
use crate::soc::bridge::signals::{MasterSignals, SlaveSignals};
use crate::soc::traits::HandshakeSlave;

/// Default size in words.
pub const DEFAULT_SIZE_WORDS: u64 = 0x100;

/// Sparse RAM acknowledging one beat per request.
#[derive(Debug)]
pub struct WordStore {
    name: String,
    width: BusWidth,
    size_words: u64,
    words: BTreeMap<u64, LaneWord>,
    /// Set on the edge that serviced a request; cleared on the next edge.
    in_transfer: bool,
    write_ops: u64,
    read_ops: u64,
}

impl WordStore {
    /// Creates an empty 32-bit store of `size_words` words.
    pub fn new(name: impl Into<String>, size_words: u64) -> Self {
        Self {
            name: name.into(),
            width: BusWidth::W32,
            size_words,
            words: BTreeMap::new(),
            in_transfer: false,
            write_ops: 0,
            read_ops: 0,
        }
    }

    /// Sets the word width.
    #[must_use]
    pub const fn with_bus_width(mut self, width: BusWidth) -> Self {
        self.width = width;
        self
    }

    /// Returns the configured size in words.
    pub const fn size_words(&self) -> u64 {
        self.size_words
    }

    /// Returns the number of writes serviced.
    pub const fn write_ops(&self) -> u64 {
        self.write_ops
    }

    /// Returns the number of reads serviced.
    pub const fn read_ops(&self) -> u64 {
        self.read_ops
    }

    /// Returns the word at `index` without counting an access.
    pub fn peek(&self, index: u64) -> LaneWord {
        self.words.get(&index).copied().unwrap_or(LaneWord::UNDEFINED)
    }

    // The bound is inclusive: index == size_words is still accepted.
    fn check_bounds(&self, index: u64) -> Result<()> {
        if index > self.size_words {
            error!(device = %self.name, index, size = self.size_words, "out of bound access");
            return Err(FabricError::BusFault {
                device: self.name.clone(),
                index,
                size: self.size_words,
            });
        }
        Ok(())
    }

    /// Reads the word at `index`.
    pub fn retrieve_word(&self, index: u64) -> Result<LaneWord> {
        self.check_bounds(index)?;
        Ok(self.peek(index))
    }

    /// Merges the lanes of `value` selected by `sel` into the word at `index`.
    ///
    /// Returns the word now stored.
    pub fn set_word(&mut self, index: u64, value: LaneWord, sel: u8) -> Result<LaneWord> {
        let word = self.retrieve_word(index)?.merge(value, sel & self.width.lane_mask());
        let _ = self.words.insert(index, word);
        Ok(word)
    }
}

impl HandshakeSlave for WordStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_clock(&mut self, inputs: &MasterSignals) -> Result<SlaveSignals> {
        if !inputs.request() {
            return Ok(SlaveSignals::default());
        }
        if self.in_transfer {
            self.in_transfer = false;
            return Ok(SlaveSignals::default());
        }

        let word = if inputs.we {
            let word = self.set_word(inputs.adr, inputs.dat, inputs.sel)?;
            self.write_ops += 1;
            trace!(device = %self.name, index = inputs.adr, ?word, "word written");
            word
        } else {
            let word = self.retrieve_word(inputs.adr)?;
            self.read_ops += 1;
            trace!(device = %self.name, index = inputs.adr, ?word, "word read");
            word
        };

        self.in_transfer = true;
        Ok(SlaveSignals {
            ack: true,
            dat: word,
        })
    }

    fn reset(&mut self) {
        self.in_transfer = false;
    }
}
