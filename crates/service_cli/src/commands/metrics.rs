//! `gexlab metrics`: headline market structure for one snapshot.

use std::io::Write;

use gex_analytics::{market_structure, MarketStructure};
use tracing::info;

use super::table::Table;
use super::{num, strikes, write_json, OutputFormat, SnapshotArgs};
use crate::config::GexlabConfig;
use crate::Result;

/// Run the metrics command
pub fn run<W: Write>(
    args: &SnapshotArgs,
    config: &GexlabConfig,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let input = args.load(config)?;
    let lot_size = input.lot_size()?;
    let params = config.analytics.params(input.valuation_date);

    let ms = market_structure(&input.snapshot, lot_size, &params)?;
    info!(
        flip_point = ms.flip_point,
        quant_power = ms.quant_power,
        regime = ms.regime.label(),
        "market structure computed"
    );

    match format {
        OutputFormat::Json => write_json(out, &ms),
        OutputFormat::Table => render(&ms, out),
    }
}

fn render<W: Write>(ms: &MarketStructure, out: &mut W) -> Result<()> {
    let mut table = Table::key_value();
    table
        .row(["Spot".to_string(), num(ms.spot)])
        .row(["Expiry".to_string(), ms.expiry.to_string()])
        .row(["ATM strike".to_string(), ms.atm.to_string()])
        .row(["Flip point".to_string(), ms.flip_point.to_string()])
        .row(["Regime".to_string(), ms.regime.to_string()])
        .row(["Quant power".to_string(), ms.quant_power.to_string()])
        .row([
            "Gamma cage".to_string(),
            format!("{} .. {} ({} strikes)", ms.cage.low, ms.cage.high, ms.cage.size),
        ])
        .row(["Vacuum strikes".to_string(), ms.vacuum_size.to_string()])
        .row(["Power zones".to_string(), strikes(&ms.power_zones)]);
    table.write_to(out)?;
    Ok(())
}
