//! Mock implementations of the fabric seams.

/// Handshake slaves: a mockall slave and a beat-recording wrapper.
pub mod slave;
