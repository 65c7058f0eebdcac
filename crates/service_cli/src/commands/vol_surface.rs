//! `gexlab vol-surface`: 25-delta risk reversal and 10-delta butterfly.

use std::io::Write;

use gex_analytics::{compute_vol_surface, VolSurfaceResult};

use super::table::Table;
use super::{num, write_json, OutputFormat, SnapshotArgs};
use crate::config::GexlabConfig;
use crate::Result;

/// Run the vol-surface command
pub fn run<W: Write>(
    args: &SnapshotArgs,
    config: &GexlabConfig,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let input = args.load(config)?;
    let surface = compute_vol_surface(&input.snapshot)?;

    match format {
        OutputFormat::Json => write_json(out, &surface),
        OutputFormat::Table => render(&surface, out),
    }
}

fn render<W: Write>(s: &VolSurfaceResult, out: &mut W) -> Result<()> {
    let mut smile = Table::new(&["Point", "Strike", "Delta", "IV"]);
    for (name, point) in [
        ("ATM", &s.atm),
        ("25D call", &s.call_25),
        ("25D put", &s.put_25),
        ("10D call", &s.call_10),
        ("10D put", &s.put_10),
    ] {
        smile.row([
            name.to_string(),
            point.strike.to_string(),
            format!("{:.3}", point.delta),
            num(point.iv),
        ]);
    }
    smile.write_to(out)?;

    let mut skew = Table::new(&["Metric", "Value", "Reading"]);
    skew.row(["RR25".to_string(), num(s.rr25), s.rr_sentiment.label().to_string()])
        .row(["BF10".to_string(), num(s.bf10), s.bf_sentiment.label().to_string()]);
    skew.write_to(out)?;
    Ok(())
}
