//! Roadwatch Observability Library
//!
//! Subscriber setup for structured logging. Libraries in the workspace only
//! emit `tracing` events; binaries call [`init_tracing`] once at startup.

pub mod init;

pub use init::*;

// Re-export tracing for convenience
pub use tracing::{debug, error, info, instrument, trace, warn, Level};
