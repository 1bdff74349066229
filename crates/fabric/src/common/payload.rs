//! Transaction payload passed from initiators through the fabric.
//!
//! A [`Transaction`] is owned by the initiator for its whole lifetime. Components receive it
//! by `&mut`, rewrite the address, fill read data into the buffer and set the response status.

use std::fmt;

/// Bus command carried by a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Copy data from the target into the transaction buffer.
    Read,
    /// Copy data from the transaction buffer into the target.
    Write,
    /// No-op command; every component in the fabric rejects it.
    Ignore,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Ignore => "ignore",
        })
    }
}

/// Completion status of a transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    /// Mandatory initial value; the transaction has not completed.
    #[default]
    Incomplete,
    /// Completed successfully.
    Ok,
    /// The target could not service the address.
    AddressError,
    /// The target does not implement the command.
    CommandError,
    /// Length or streaming width not supported by the target.
    BurstError,
    /// Byte enables present but not supported by the target.
    ByteEnableError,
    /// Any other failure.
    GenericError,
}

impl ResponseStatus {
    /// Returns `true` for every status an initiator must treat as a failure.
    pub const fn is_error(self) -> bool {
        !matches!(self, Self::Ok | Self::Incomplete)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Incomplete => "incomplete response",
            Self::Ok => "ok response",
            Self::AddressError => "address error response",
            Self::CommandError => "command error response",
            Self::BurstError => "burst error response",
            Self::ByteEnableError => "byte enable error response",
            Self::GenericError => "generic error response",
        })
    }
}

/// Byte-enable value marking a lane as written.
pub const BYTE_ENABLED: u8 = 0xFF;
/// Byte-enable value marking a lane as untouched.
pub const BYTE_DISABLED: u8 = 0x00;

/// Generic payload of one atomic bus transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Read, write or ignore.
    pub command: Command,
    /// Byte address; rewritten into target-local space by the router.
    pub address: u64,
    /// Data buffer; holds `streaming_width` bytes for bursts.
    pub data: Vec<u8>,
    /// Bytes moved per beat.
    pub length: u32,
    /// Per-byte enables (non-zero = enabled); `None` enables every lane.
    pub byte_enable: Option<Vec<u8>>,
    /// Total bytes moved across all beats; `0` is normalised to `length` by the bridge.
    pub streaming_width: u32,
    /// Completion status set by the servicing target.
    pub status: ResponseStatus,
    /// Set by targets that would grant a direct-access handle for this address.
    pub dmi_allowed: bool,
}

impl Transaction {
    /// Creates a single-beat read of `length` bytes.
    pub fn read(address: u64, length: u32) -> Self {
        Self {
            command: Command::Read,
            address,
            data: vec![0; length as usize],
            length,
            byte_enable: None,
            streaming_width: length,
            status: ResponseStatus::Incomplete,
            dmi_allowed: false,
        }
    }

    /// Creates a single-beat write carrying `data`.
    pub fn write(address: u64, data: Vec<u8>) -> Self {
        let length = data.len() as u32;
        Self {
            command: Command::Write,
            address,
            data,
            length,
            byte_enable: None,
            streaming_width: length,
            status: ResponseStatus::Incomplete,
            dmi_allowed: false,
        }
    }

    /// Sets the per-beat length, keeping the buffer at least as large.
    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        if self.data.len() < length as usize {
            self.data.resize(length as usize, 0);
        }
        self
    }

    /// Sets the streaming width, growing the buffer to cover every beat.
    #[must_use]
    pub fn with_streaming_width(mut self, width: u32) -> Self {
        self.streaming_width = width;
        if self.data.len() < width as usize {
            self.data.resize(width as usize, 0);
        }
        self
    }

    /// Attaches byte enables.
    #[must_use]
    pub fn with_byte_enable(mut self, enables: Vec<u8>) -> Self {
        self.byte_enable = Some(enables);
        self
    }

    /// Replaces the command.
    #[must_use]
    pub const fn with_command(mut self, command: Command) -> Self {
        self.command = command;
        self
    }

    /// Returns whether the byte at `offset` of the data buffer is enabled.
    ///
    /// Enables shorter than the data buffer repeat cyclically.
    pub fn byte_enabled(&self, offset: usize) -> bool {
        match &self.byte_enable {
            None => true,
            Some(enables) if enables.is_empty() => true,
            Some(enables) => enables[offset % enables.len()] != BYTE_DISABLED,
        }
    }

    /// Returns `true` once a target reported an error status.
    pub const fn is_response_error(&self) -> bool {
        self.status.is_error()
    }

    /// First four data bytes as a little-endian word (missing bytes read as zero).
    pub fn first_word(&self) -> u32 {
        let mut word = [0u8; 4];
        for (dst, src) in word.iter_mut().zip(&self.data) {
            *dst = *src;
        }
        u32::from_le_bytes(word)
    }

    /// First four byte enables packed little-endian into a word (zero when absent).
    pub fn enable_mask(&self) -> u32 {
        match &self.byte_enable {
            None => 0,
            Some(enables) => enables
                .iter()
                .take(4)
                .enumerate()
                .fold(0, |mask, (i, b)| mask | (u32::from(*b) << (i * 8))),
        }
    }
}
