//! Background Tasks Module
//!
//! Long-running tasks spawned alongside the HTTP server.

mod cleanup;

pub use cleanup::spawn_expiry_sweep;
