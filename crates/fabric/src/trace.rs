//! Transaction log.
//!
//! This module records every routed transaction as one CSV line. It provides:
//! 1. **Format:** A fixed header followed by one record per transaction.
//! 2. **File sink:** Size-based rotation to `path.1`, `path.2`, ... keeping a bounded number of
//!    files; each file starts with the header.
//! 3. **Shared sink:** An in-memory buffer that harnesses can inspect while the router owns the
//!    log.
//!
//! The log is injected into the router; nothing is registered globally.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::common::{FabricError, Result, SimTime, Transaction};
use crate::config::TraceConfig;

/// First line of every log file.
pub const HEADER: &str =
    "TimeStamp, Target, Initiator, Address, Cmd, Value, Len, Wid, Byte-enable, Data";

/// One routed transaction, as written to the log.
///
/// Columns are named from the router's side: `Target` is the router port (target socket) the
/// transaction arrived on and `Initiator` is the downstream index the decoder forwarded it to.
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    /// Router time when the transaction completed.
    pub time: SimTime,
    /// Downstream target index chosen by the decoder; the `Initiator` column.
    pub target: usize,
    /// Upstream port the transaction arrived on; the `Target` column.
    pub initiator: usize,
    /// Address as issued, before the post-decode mask.
    pub address: u64,
    /// The transaction after the target serviced it.
    pub txn: &'a Transaction,
}

impl LogRecord<'_> {
    /// Formats the record as one CSV line without the trailing newline.
    pub fn to_line(&self) -> String {
        let txn = self.txn;
        let mut data = String::with_capacity(txn.data.len() * 2);
        for byte in &txn.data {
            let _ = write!(data, "{byte:02x}");
        }
        format!(
            "{},{},{},{:#x},{},{:#x},{},{},{:#x},{}",
            self.time,
            self.initiator,
            self.target,
            self.address,
            txn.command,
            txn.first_word(),
            txn.length,
            txn.streaming_width,
            txn.enable_mask(),
            data
        )
    }
}

/// In-memory log contents shared between the log and its reader.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Returns the text written so far.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Returns the logged lines, header included.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    fn append(&self, text: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(text.as_bytes());
    }
}

#[derive(Debug)]
struct RotatingFile {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
    max_bytes: u64,
    max_files: usize,
}

impl RotatingFile {
    fn create(path: PathBuf, max_bytes: u64, max_files: usize) -> Result<Self> {
        let file = File::create(&path).map_err(|e| FabricError::io(&path, e))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
            max_bytes,
            max_files: max_files.max(1),
        })
    }

    fn rotated_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    }

    /// Shifts `path.(n)` to `path.(n+1)` for every kept file, then reopens `path` empty.
    fn rotate(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| FabricError::io(&self.path, e))?;

        if self.max_files > 1 {
            let oldest = self.rotated_path(self.max_files - 1);
            if oldest.exists() {
                fs::remove_file(&oldest).map_err(|e| FabricError::io(&oldest, e))?;
            }
            for n in (1..self.max_files - 1).rev() {
                let from = self.rotated_path(n);
                if from.exists() {
                    let to = self.rotated_path(n + 1);
                    fs::rename(&from, &to).map_err(|e| FabricError::io(&from, e))?;
                }
            }
            let first = self.rotated_path(1);
            fs::rename(&self.path, &first).map_err(|e| FabricError::io(&self.path, e))?;
        }

        let file = File::create(&self.path).map_err(|e| FabricError::io(&self.path, e))?;
        self.writer = BufWriter::new(file);
        self.written = 0;
        debug!(path = %self.path.display(), "transaction log rotated");
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|()| self.writer.write_all(b"\n"))
            .map_err(|e| FabricError::io(&self.path, e))?;
        self.written += line.len() as u64 + 1;
        Ok(())
    }
}

#[derive(Debug)]
enum Sink {
    File(RotatingFile),
    Shared(SharedBuffer),
}

/// Append-only CSV log of routed transactions.
#[derive(Debug)]
pub struct TransactionLog {
    sink: Sink,
    records: u64,
}

impl TransactionLog {
    /// Creates (truncating) a rotating log file at `path` and writes the header.
    pub fn create(path: impl AsRef<Path>, max_bytes: u64, max_files: usize) -> Result<Self> {
        let mut file = RotatingFile::create(path.as_ref().to_path_buf(), max_bytes, max_files)?;
        file.write_line(HEADER)?;
        Ok(Self {
            sink: Sink::File(file),
            records: 0,
        })
    }

    /// Creates a rotating log from configuration.
    pub fn from_config(config: &TraceConfig) -> Result<Self> {
        Self::create(&config.path, config.max_bytes, config.max_files)
    }

    /// Creates an in-memory log and returns it with a handle for reading it back.
    pub fn in_memory() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        buffer.append(HEADER);
        buffer.append("\n");
        let log = Self {
            sink: Sink::Shared(buffer.clone()),
            records: 0,
        };
        (log, buffer)
    }

    /// Number of records written since creation.
    pub const fn records(&self) -> u64 {
        self.records
    }

    /// Appends one record, rotating the file first if the line would exceed the size limit.
    pub fn record(&mut self, record: &LogRecord<'_>) -> Result<()> {
        let line = record.to_line();
        match &mut self.sink {
            Sink::File(file) => {
                let needed = line.len() as u64 + 1;
                if file.written + needed > file.max_bytes && file.written > HEADER.len() as u64 + 1
                {
                    file.rotate()?;
                    file.write_line(HEADER)?;
                }
                file.write_line(&line)?;
            }
            Sink::Shared(buffer) => {
                buffer.append(&line);
                buffer.append("\n");
            }
        }
        self.records += 1;
        Ok(())
    }

    /// Flushes buffered lines to the file.
    pub fn flush(&mut self) -> Result<()> {
        match &mut self.sink {
            Sink::File(file) => file
                .writer
                .flush()
                .map_err(|e| FabricError::io(&file.path, e)),
            Sink::Shared(_) => Ok(()),
        }
    }
}
