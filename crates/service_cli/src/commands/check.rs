//! `gexlab check`: effective configuration and data availability.

use std::io::Write;
use std::path::PathBuf;

use adapter_chain::{LoadError, SnapshotDirectory};
use serde::Serialize;

use super::table::Table;
use super::{write_json, OutputFormat};
use crate::config::GexlabConfig;
use crate::Result;

#[derive(Debug, Serialize)]
struct IndexStatus {
    name: String,
    lot_size: u32,
    expiries: usize,
    latest: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    version: &'static str,
    data_dir_exists: bool,
    config: &'a GexlabConfig,
    indices: Vec<IndexStatus>,
}

/// Run the check command
pub fn run<W: Write>(config: &GexlabConfig, format: OutputFormat, out: &mut W) -> Result<()> {
    let dir = SnapshotDirectory::new(&config.data_dir);

    let mut indices = Vec::with_capacity(config.indices.len());
    for (name, index) in &config.indices {
        let latest = match dir.latest(name) {
            Ok(path) => Some(path),
            Err(LoadError::NoSnapshots { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        indices.push(IndexStatus {
            name: name.clone(),
            lot_size: index.lot_size,
            expiries: dir.expiries(name)?.len(),
            latest,
        });
    }

    let report = CheckReport {
        version: env!("CARGO_PKG_VERSION"),
        data_dir_exists: dir.root().is_dir(),
        config,
        indices,
    };

    match format {
        OutputFormat::Json => write_json(out, &report),
        OutputFormat::Table => render(&report, out),
    }
}

fn render<W: Write>(report: &CheckReport<'_>, out: &mut W) -> Result<()> {
    let a = &report.config.analytics;
    let mut settings = Table::key_value();
    settings
        .row(["Version", report.version])
        .row(["Log level", report.config.log_level.as_filter_str()]);
    settings
        .row([
            "Data directory".to_string(),
            format!(
                "{}{}",
                report.config.data_dir.display(),
                if report.data_dir_exists { "" } else { " (missing)" }
            ),
        ])
        .row(["Risk-free rate".to_string(), a.risk_free_rate.to_string()])
        .row(["Vanna weight".to_string(), a.vanna_weight.to_string()])
        .row(["Cage width".to_string(), a.cage_width.to_string()])
        .row(["Power zones".to_string(), a.top_n.to_string()])
        .row(["Strike radius".to_string(), a.strike_radius.to_string()])
        .row([
            "Strike step".to_string(),
            format!(
                "{}{}",
                a.strike_step,
                if a.infer_strike_step { " (fallback)" } else { "" }
            ),
        ]);
    settings.write_to(out)?;

    let mut indices = Table::new(&["Index", "Lot size", "Expiries", "Latest snapshot"]);
    for status in &report.indices {
        indices.row([
            status.name.clone(),
            status.lot_size.to_string(),
            status.expiries.to_string(),
            status
                .latest
                .as_ref()
                .map_or_else(|| "-".to_string(), |p| p.display().to_string()),
        ]);
    }
    indices.write_to(out)?;
    Ok(())
}
