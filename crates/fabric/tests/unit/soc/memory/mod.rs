/// Debug path and direct memory access.
pub mod debug_dmi;


/// Protocol-path transport.
pub mod protocol;
