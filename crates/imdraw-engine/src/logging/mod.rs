//! Logging setup.
//!
//! The engine only talks to the `log` facade; this module wires up
//! `env_logger` for binaries that want the default backend.

mod init;

pub use init::{init_logging, LoggingConfig};
