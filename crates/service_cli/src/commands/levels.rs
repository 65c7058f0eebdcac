//! `gexlab levels`: key levels from gamma exposure.

use std::io::Write;

use gex_analytics::exposure::{compute_exposure, ExposureKind};
use gex_analytics::{detect_key_levels_with, KeyLevels};

use super::table::Table;
use super::{num, strikes, write_json, OutputFormat, SnapshotArgs};
use crate::config::GexlabConfig;
use crate::Result;

/// Run the levels command
pub fn run<W: Write>(
    args: &SnapshotArgs,
    config: &GexlabConfig,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let input = args.load(config)?;
    let gex = compute_exposure(&input.snapshot, input.lot_size()?, ExposureKind::Gamma)?;
    let params = config.analytics.params(input.valuation_date);
    let levels = detect_key_levels_with(&gex, &params.key_levels())?;

    match format {
        OutputFormat::Json => write_json(out, &levels),
        OutputFormat::Table => render(&levels, out),
    }
}

fn render<W: Write>(levels: &KeyLevels, out: &mut W) -> Result<()> {
    let mut table = Table::key_value();
    table
        .row(["Spot".to_string(), num(levels.spot)])
        .row(["ATM strike".to_string(), levels.atm_strike.to_string()])
        .row(["Flip point".to_string(), levels.flip_point.to_string()])
        .row(["Regime".to_string(), levels.regime.to_string()])
        .row(["Strike step".to_string(), levels.strike_step.to_string()])
        .row([
            "Gamma cage".to_string(),
            format!("{} .. {}", levels.cage.low, levels.cage.high),
        ])
        .row(["Cage strikes".to_string(), strikes(&levels.cage.strikes)])
        .row(["Vacuum strikes".to_string(), levels.vacuum.len().to_string()])
        .row(["Power zones".to_string(), strikes(&levels.power_zones)]);
    table.write_to(out)?;
    Ok(())
}
