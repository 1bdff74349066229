//! Fixed-function targets.
//!
//! This module contains targets that are neither dense memories nor handshake slaves, such as
//! read-only boot images.

/// Read-only image target.
pub mod rom;

pub use rom::Rom;
