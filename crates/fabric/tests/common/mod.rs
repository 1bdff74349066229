//! Shared test infrastructure.

/// Tracing setup and prebuilt fabrics.
pub mod harness;

/// Mock targets and slaves.
pub mod mocks;
