//! gexlab service layer
//!
//! Configuration, logging bootstrap and command implementations behind the
//! `gexlab` binary. The analytics crates stay free of I/O; everything that
//! touches files, the environment or the terminal lives here or in
//! `adapter_chain`.

pub mod commands;
pub mod config;
pub mod error;

pub use error::{CliError, Result};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
///
/// Logs go to stderr so JSON output on stdout stays machine-readable.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
