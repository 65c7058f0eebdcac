//! `gexlab flow`: classify trading between two captures.

use std::io::Write;
use std::path::PathBuf;

use adapter_chain::{read_snapshot, SnapshotDirectory};
use clap::Args;
use gex_analytics::flow::SideFlowSummary;
use gex_analytics::{classify_flow, FlowResult};
use gex_core::types::OptionSide;
use tracing::{info, warn};

use super::table::Table;
use super::{existing, num, opt, write_json, OutputFormat};
use crate::config::GexlabConfig;
use crate::{CliError, Result};

/// Arguments of the flow command
#[derive(Debug, Clone, Default, Args)]
pub struct FlowArgs {
    /// Current snapshot CSV
    #[arg(long, requires = "prev", conflicts_with = "index")]
    pub now: Option<PathBuf>,

    /// Earlier snapshot CSV
    #[arg(long, requires = "now")]
    pub prev: Option<PathBuf>,

    /// Index name; compares its two newest snapshots
    #[arg(short, long)]
    pub index: Option<String>,

    /// Contracts per lot (defaults to the index's configured lot size)
    #[arg(short, long)]
    pub lot_size: Option<u32>,

    /// Also list every leg
    #[arg(long)]
    pub detail: bool,
}

impl FlowArgs {
    fn paths(&self, config: &GexlabConfig) -> Result<(PathBuf, PathBuf)> {
        match (&self.now, &self.prev, &self.index) {
            (Some(now), Some(prev), _) => Ok((existing(now)?, existing(prev)?)),
            (None, None, Some(index)) => {
                Ok(SnapshotDirectory::new(&config.data_dir).latest_pair(index)?)
            }
            _ => Err(CliError::InvalidArgument(
                "pass --now and --prev, or --index".to_string(),
            )),
        }
    }

    fn lot_size(&self, config: &GexlabConfig) -> Result<u32> {
        self.lot_size
            .or_else(|| self.index.as_deref().and_then(|i| config.lot_size(i)))
            .ok_or_else(|| {
                CliError::InvalidArgument(
                    "lot size unknown: pass --lot-size or a configured --index".to_string(),
                )
            })
    }
}

/// Run the flow command
pub fn run<W: Write>(
    args: &FlowArgs,
    config: &GexlabConfig,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let lot_size = args.lot_size(config)?;
    let (now_path, prev_path) = args.paths(config)?;
    info!(now = %now_path.display(), prev = %prev_path.display(), "classifying flow");

    let now = read_snapshot(&now_path)?;
    let prev = read_snapshot(&prev_path)?;
    if now.expiry() != prev.expiry() {
        warn!(
            now = %now.expiry(),
            prev = %prev.expiry(),
            "snapshots have different expiries; no legs will match"
        );
    }

    let flow = classify_flow(&now, &prev, lot_size)?;

    match format {
        OutputFormat::Json => write_json(out, &flow),
        OutputFormat::Table => render(&flow, args.detail, out),
    }
}

fn render<W: Write>(flow: &FlowResult, detail: bool, out: &mut W) -> Result<()> {
    let mut summary = Table::new(&[
        "Side",
        "Bought to open",
        "Sold to open",
        "Bought to close",
        "Short covered",
        "Pressure",
        "Reading",
    ]);
    for side in OptionSide::ALL {
        let s: &SideFlowSummary = flow.side(side);
        summary.row([
            side.as_str().to_string(),
            num(s.bought_to_open),
            num(s.sold_to_open),
            num(s.bought_to_close),
            num(s.short_covered),
            format!("{:.3}", s.pressure),
            s.label.label().to_string(),
        ]);
    }
    summary.write_to(out)?;

    if detail {
        let mut legs = Table::new(&[
            "Strike", "Side", "Volume", "IV chg", "OI chg", "Intensity", "Class", "Dollar flow",
        ]);
        for r in &flow.records {
            legs.row([
                r.strike.to_string(),
                r.side.as_str().to_string(),
                r.incremental_volume.to_string(),
                format!("{:+.4}", r.iv_change),
                r.oi_change.to_string(),
                opt(r.vol_intensity),
                r.flow_class.as_str().to_string(),
                num(r.dollar_flow),
            ]);
        }
        legs.write_to(out)?;
    }
    Ok(())
}
