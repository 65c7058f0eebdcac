//! CLI error types.

use adapter_chain::LoadError;
use gex_core::types::ComputationError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced to the `gexlab` user.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Argument combination or value is not usable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be built.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Snapshot could not be loaded or written.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// An analytics component failed.
    #[error("Computation error: {0}")]
    Computation(#[from] ComputationError),

    /// Terminal or file output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
