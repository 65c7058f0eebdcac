//! `gexlab exposure`: per-strike GEX/DEX/VEX/CEX.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use adapter_chain::write_exposure_csv;
use gex_analytics::exposure::{compute_exposure, ExposureKind, ExposureTable};
use tracing::info;

use super::table::Table;
use super::{num, write_json, OutputFormat, SnapshotArgs};
use crate::config::GexlabConfig;
use crate::{CliError, Result};

/// Run the exposure command
///
/// With no `kind`, all four exposures are computed.
pub fn run<W: Write>(
    args: &SnapshotArgs,
    config: &GexlabConfig,
    kind: Option<ExposureKind>,
    csv: Option<&PathBuf>,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let input = args.load(config)?;
    let lot_size = input.lot_size()?;

    let kinds = match kind {
        Some(kind) => vec![kind],
        None => ExposureKind::ALL.to_vec(),
    };
    let tables = kinds
        .into_iter()
        .map(|kind| compute_exposure(&input.snapshot, lot_size, kind))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if let Some(path) = csv {
        let file = File::create(path).map_err(|e| {
            CliError::InvalidArgument(format!("cannot create {}: {}", path.display(), e))
        })?;
        write_exposure_csv(file, &tables)?;
        info!(path = %path.display(), tables = tables.len(), "wrote exposure CSV");
    }

    match format {
        OutputFormat::Json => write_json(out, &tables),
        OutputFormat::Table => {
            for table in &tables {
                render(table, out)?;
            }
            Ok(())
        }
    }
}

fn render<W: Write>(table: &ExposureTable, out: &mut W) -> Result<()> {
    let code = table.kind().code().to_uppercase();
    writeln!(
        out,
        "{} exposure (lot {}, spot {})",
        code,
        table.lot_size(),
        num(table.spot())
    )?;

    let mut grid = Table::new(&["Strike", "Call", "Put", "Total"]);
    for row in table.rows() {
        grid.row([
            row.strike.to_string(),
            num(row.call),
            num(row.put),
            num(row.total),
        ]);
    }
    let totals = table.totals();
    grid.row([
        "Σ".to_string(),
        num(totals.call),
        num(totals.put),
        num(totals.net),
    ]);
    grid.write_to(out)?;
    Ok(())
}
