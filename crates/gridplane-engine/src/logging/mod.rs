//! Logging setup.
//!
//! Wires the `log` facade to `env_logger` once per process. GPU backend crates
//! are noisy at `info`, so the default filter caps them at `warn`.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
