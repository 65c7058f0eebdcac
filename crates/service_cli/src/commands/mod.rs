//! CLI command implementations
//!
//! Each submodule implements one `gexlab` subcommand. Commands write their
//! result to the supplied writer and log progress through `tracing`.

pub mod check;
pub mod exposure;
pub mod filter;
pub mod flow;
pub mod levels;
pub mod metrics;
pub mod quant_power;
pub mod table;
pub mod vol_surface;

use std::io::Write;
use std::path::{Path, PathBuf};

use adapter_chain::{read_snapshot, SnapshotDirectory};
use clap::{Args, ValueEnum};
use gex_analytics::filter_near_strikes;
use gex_core::chain::ChainSnapshot;
use gex_core::types::Date;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GexlabConfig;
use crate::{CliError, Result};

/// Output rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Human-readable tables
    #[default]
    Table,
}

/// Where a command reads its snapshot from.
#[derive(Debug, Clone, Default, Args)]
pub struct SnapshotArgs {
    /// Snapshot CSV file
    #[arg(short, long, conflicts_with = "index")]
    pub file: Option<PathBuf>,

    /// Index name; uses its newest snapshot under the data directory
    #[arg(short, long)]
    pub index: Option<String>,

    /// Contracts per lot (defaults to the index's configured lot size)
    #[arg(short, long)]
    pub lot_size: Option<u32>,

    /// Valuation date (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    pub date: Option<Date>,

    /// Keep only strikes near ATM (`analytics.strike_radius`)
    #[arg(long)]
    pub near: bool,
}

/// A loaded snapshot and its context.
#[derive(Debug, Clone)]
pub struct Input {
    /// File the snapshot was read from
    pub source: PathBuf,
    /// Snapshot, already windowed when `--near` was given
    pub snapshot: ChainSnapshot,
    /// Valuation date
    pub valuation_date: Date,
    lot_size: Option<u32>,
}

impl Input {
    /// Lot size from `--lot-size` or the index registry.
    pub fn lot_size(&self) -> Result<u32> {
        self.lot_size.ok_or_else(|| {
            CliError::InvalidArgument(
                "lot size unknown: pass --lot-size or a configured --index".to_string(),
            )
        })
    }
}

impl SnapshotArgs {
    /// Resolves and reads the snapshot.
    pub fn load(&self, config: &GexlabConfig) -> Result<Input> {
        let source = match (&self.file, &self.index) {
            (Some(file), _) => existing(file)?,
            (None, Some(index)) => SnapshotDirectory::new(&config.data_dir).latest(index)?,
            (None, None) => {
                return Err(CliError::InvalidArgument(
                    "one of --file or --index is required".to_string(),
                ))
            }
        };

        let mut snapshot = read_snapshot(&source)?;
        if self.near {
            snapshot = filter_near_strikes(&snapshot, config.analytics.strike_radius)?;
            debug!(strikes = snapshot.len(), "kept strikes near ATM");
        }

        let lot_size = self
            .lot_size
            .or_else(|| self.index.as_deref().and_then(|i| config.lot_size(i)));
        let valuation_date = self.date.unwrap_or_else(Date::today);

        info!(
            source = %source.display(),
            valuation_date = %valuation_date,
            "snapshot ready"
        );

        Ok(Input {
            source,
            snapshot,
            valuation_date,
            lot_size,
        })
    }
}

pub(crate) fn existing(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(CliError::FileNotFound(path.display().to_string()))
    }
}

pub(crate) fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Two-decimal rendering for table cells.
pub(crate) fn num(value: f64) -> String {
    format!("{value:.2}")
}

pub(crate) fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), num)
}

pub(crate) fn strikes(values: &[f64]) -> String {
    values.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(", ")
}
