//! Adapter errors.

use std::path::PathBuf;

use gex_core::types::SnapshotError;
use thiserror::Error;

/// Errors raised while loading or storing snapshots.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Filesystem access failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The CSV could not be parsed or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header.
    #[error("Missing required column '{column}'")]
    MissingColumn {
        /// Column name
        column: &'static str,
    },

    /// The rows do not form a valid snapshot.
    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    /// No snapshot files exist where one was expected.
    #[error("No snapshots found for {index} under {dir}")]
    NoSnapshots {
        /// Index name
        index: String,
        /// Directory searched
        dir: PathBuf,
    },

    /// Fewer snapshot files than an operation needs.
    #[error("Need {needed} snapshots for {index} under {dir}, found {found}")]
    NotEnoughSnapshots {
        /// Index name
        index: String,
        /// Expiry directory searched
        dir: PathBuf,
        /// Files required
        needed: usize,
        /// Files present
        found: usize,
    },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}
