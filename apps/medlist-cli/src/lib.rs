//! Shared plumbing of the `medlist` and `medlist-indexer` binaries.

pub mod commands;
pub mod present;

use tracing_subscriber::EnvFilter;

/// Logs go to stderr so command output stays pipeable. `RUST_LOG` overrides
/// the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
