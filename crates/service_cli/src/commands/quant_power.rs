//! `gexlab quant-power`: zero crossing of cumulative dealer delta.

use std::io::Write;

use gex_analytics::{compute_quant_power, QuantPowerResult};
use tracing::debug;

use super::table::Table;
use super::{num, opt, write_json, OutputFormat, SnapshotArgs};
use crate::config::GexlabConfig;
use crate::Result;

/// Run the quant-power command
pub fn run<W: Write>(
    args: &SnapshotArgs,
    config: &GexlabConfig,
    format: OutputFormat,
    points: bool,
    out: &mut W,
) -> Result<()> {
    let input = args.load(config)?;
    let params = config
        .analytics
        .params(input.valuation_date)
        .quant_power(input.lot_size()?);
    let result = compute_quant_power(&input.snapshot, &params)?;
    debug!(crossing = ?result.crossing, "quant power computed");

    match format {
        OutputFormat::Json => write_json(out, &result),
        OutputFormat::Table => render(&result, points, out),
    }
}

fn render<W: Write>(result: &QuantPowerResult, points: bool, out: &mut W) -> Result<()> {
    let mut summary = Table::key_value();
    summary
        .row(["Quant power".to_string(), result.quant_power_strike.to_string()])
        .row(["Crossing".to_string(), opt(result.crossing)])
        .row([
            "Power zone".to_string(),
            format!("{} .. {}", result.power_zone_lower, result.power_zone_upper),
        ]);
    summary.write_to(out)?;

    if points {
        let mut table = Table::new(&["Strike", "Blended", "Dealer delta", "Cumulative"]);
        for p in &result.points {
            table.row([
                p.strike.to_string(),
                num(p.blended),
                num(p.dealer_delta),
                num(p.cumulative_delta),
            ]);
        }
        table.write_to(out)?;
    }
    Ok(())
}
