//! `gexlab filter`: strike window around ATM.

use std::io::Write;
use std::path::PathBuf;

use adapter_chain::{write_snapshot, write_snapshot_to};
use gex_analytics::filter_near_strikes;
use tracing::info;

use super::{write_json, OutputFormat, SnapshotArgs};
use crate::config::GexlabConfig;
use crate::Result;

/// Run the filter command
///
/// Writes the window to `output` when given, otherwise to `out` as CSV
/// (table format) or JSON.
pub fn run<W: Write>(
    args: &SnapshotArgs,
    config: &GexlabConfig,
    radius: Option<usize>,
    output: Option<&PathBuf>,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let input = args.load(config)?;
    let radius = radius.unwrap_or(config.analytics.strike_radius);
    let near = filter_near_strikes(&input.snapshot, radius)?;
    info!(
        radius,
        kept = near.len(),
        of = input.snapshot.len(),
        "filtered strikes"
    );

    match (output, format) {
        (Some(path), _) => {
            write_snapshot(path, &near)?;
            writeln!(out, "{}", path.display())?;
            Ok(())
        }
        (None, OutputFormat::Json) => write_json(out, &near),
        (None, OutputFormat::Table) => {
            write_snapshot_to(&mut *out, &near)?;
            Ok(())
        }
    }
}
