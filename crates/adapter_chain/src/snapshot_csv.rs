//! Persisted CSV layout for chain snapshots.
//!
//! Each row repeats `Spot` and `expiry`; [`ChainSnapshot::from_records`]
//! collapses them and rejects rows that disagree. Counters (`*_OI`, `*_vol`,
//! `*_prev_oi`) are read as floats so vendor text such as `1500.0` loads,
//! then checked to be non-negative integers.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use gex_analytics::exposure::ExposureTable;
use gex_core::chain::{ChainRecord, ChainSnapshot, Greek, SideQuote, StrikeRow};
use gex_core::types::{OptionSide, SnapshotError};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info};

use crate::error::LoadError;

/// Columns that must be present in every snapshot file.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Strike", "Spot", "expiry", "Call_OI", "Put_OI"];

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Strike")]
    strike: f64,
    #[serde(rename = "Spot")]
    spot: f64,
    expiry: String,
    #[serde(rename = "Call_OI", default, serialize_with = "write_count")]
    call_oi: Option<f64>,
    #[serde(rename = "Put_OI", default, serialize_with = "write_count")]
    put_oi: Option<f64>,

    #[serde(default)]
    call_iv: Option<f64>,
    #[serde(default)]
    call_delta: Option<f64>,
    #[serde(default)]
    call_gamma: Option<f64>,
    #[serde(default)]
    call_vanna: Option<f64>,
    #[serde(default)]
    call_charm: Option<f64>,
    #[serde(default)]
    call_ltp: Option<f64>,
    #[serde(default)]
    call_close: Option<f64>,
    #[serde(default, serialize_with = "write_count")]
    call_vol: Option<f64>,
    #[serde(default, serialize_with = "write_count")]
    call_prev_oi: Option<f64>,

    #[serde(default)]
    put_iv: Option<f64>,
    #[serde(default)]
    put_delta: Option<f64>,
    #[serde(default)]
    put_gamma: Option<f64>,
    #[serde(default)]
    put_vanna: Option<f64>,
    #[serde(default)]
    put_charm: Option<f64>,
    #[serde(default)]
    put_ltp: Option<f64>,
    #[serde(default)]
    put_close: Option<f64>,
    #[serde(default, serialize_with = "write_count")]
    put_vol: Option<f64>,
    #[serde(default, serialize_with = "write_count")]
    put_prev_oi: Option<f64>,
}

/// One side's columns, detached from the flat row.
struct SideColumns {
    oi: Option<f64>,
    iv: Option<f64>,
    delta: Option<f64>,
    gamma: Option<f64>,
    vanna: Option<f64>,
    charm: Option<f64>,
    ltp: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
    prev_oi: Option<f64>,
}

impl SideColumns {
    fn from_quote(quote: &SideQuote) -> Self {
        Self {
            oi: Some(quote.oi() as f64),
            iv: quote.iv(),
            delta: quote.greek(Greek::Delta),
            gamma: quote.greek(Greek::Gamma),
            vanna: quote.greek(Greek::Vanna),
            charm: quote.greek(Greek::Charm),
            ltp: quote.ltp(),
            close: quote.close(),
            volume: quote.volume().map(|v| v as f64),
            prev_oi: quote.prev_oi().map(|v| v as f64),
        }
    }

    fn into_quote(self, strike: f64, side: OptionSide) -> Result<SideQuote, SnapshotError> {
        let (oi_column, vol_column, prev_oi_column) = match side {
            OptionSide::Call => ("Call_OI", "call_vol", "call_prev_oi"),
            OptionSide::Put => ("Put_OI", "put_vol", "put_prev_oi"),
        };

        // Missing open interest is zero; missing volume stays missing.
        let oi = count(strike, side, oi_column, self.oi)?.unwrap_or(0);
        let volume = count(strike, side, vol_column, self.volume)?;
        let prev_oi = count(strike, side, prev_oi_column, self.prev_oi)?;

        Ok(SideQuote::new(oi)
            .with_volume(volume)
            .with_prev_oi(prev_oi)
            .with_iv(self.iv)
            .with_delta(self.delta)
            .with_gamma(self.gamma)
            .with_vanna(self.vanna)
            .with_charm(self.charm)
            .with_ltp(self.ltp)
            .with_close(self.close))
    }
}

impl CsvRow {
    fn from_row(spot: f64, expiry: &str, row: &StrikeRow) -> Self {
        let call = SideColumns::from_quote(&row.call);
        let put = SideColumns::from_quote(&row.put);
        Self {
            strike: row.strike,
            spot,
            expiry: expiry.to_string(),
            call_oi: call.oi,
            put_oi: put.oi,
            call_iv: call.iv,
            call_delta: call.delta,
            call_gamma: call.gamma,
            call_vanna: call.vanna,
            call_charm: call.charm,
            call_ltp: call.ltp,
            call_close: call.close,
            call_vol: call.volume,
            call_prev_oi: call.prev_oi,
            put_iv: put.iv,
            put_delta: put.delta,
            put_gamma: put.gamma,
            put_vanna: put.vanna,
            put_charm: put.charm,
            put_ltp: put.ltp,
            put_close: put.close,
            put_vol: put.volume,
            put_prev_oi: put.prev_oi,
        }
    }

    fn into_record(self) -> Result<ChainRecord, SnapshotError> {
        let call = SideColumns {
            oi: self.call_oi,
            iv: self.call_iv,
            delta: self.call_delta,
            gamma: self.call_gamma,
            vanna: self.call_vanna,
            charm: self.call_charm,
            ltp: self.call_ltp,
            close: self.call_close,
            volume: self.call_vol,
            prev_oi: self.call_prev_oi,
        };
        let put = SideColumns {
            oi: self.put_oi,
            iv: self.put_iv,
            delta: self.put_delta,
            gamma: self.put_gamma,
            vanna: self.put_vanna,
            charm: self.put_charm,
            ltp: self.put_ltp,
            close: self.put_close,
            volume: self.put_vol,
            prev_oi: self.put_prev_oi,
        };

        Ok(ChainRecord {
            strike: self.strike,
            spot: self.spot,
            call: call.into_quote(self.strike, OptionSide::Call)?,
            put: put.into_quote(self.strike, OptionSide::Put)?,
            expiry: self.expiry,
        })
    }
}

fn count(
    strike: f64,
    side: OptionSide,
    field: &'static str,
    value: Option<f64>,
) -> Result<Option<u64>, SnapshotError> {
    match value {
        None => Ok(None),
        Some(v) if v.is_nan() => Ok(None),
        Some(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Ok(Some(v as u64)),
        Some(value) => Err(SnapshotError::InvalidCount {
            strike,
            side,
            field,
            value,
        }),
    }
}

fn write_count<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&(*v as u64)),
        None => serializer.serialize_none(),
    }
}

/// Reads a snapshot from any CSV source.
///
/// # Errors
/// - `LoadError::MissingColumn` if a [`REQUIRED_COLUMNS`] header is absent
/// - `LoadError::Csv` for malformed rows or unparseable numbers
/// - `LoadError::Snapshot` if the rows violate snapshot invariants
pub fn read_snapshot_from<R: io::Read>(reader: R) -> Result<ChainSnapshot, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .copied()
        .find(|column| !headers.iter().any(|h| h == *column))
    {
        return Err(LoadError::MissingColumn { column });
    }

    let mut records = Vec::new();
    for row in rdr.deserialize::<CsvRow>() {
        records.push(row?.into_record()?);
    }

    let snapshot = ChainSnapshot::from_records(records)?;
    debug!(
        strikes = snapshot.len(),
        expiry = %snapshot.expiry(),
        spot = snapshot.spot(),
        "parsed chain snapshot"
    );
    Ok(snapshot)
}

/// Reads a snapshot file.
///
/// # Errors
/// `LoadError::Io` if the file cannot be opened, otherwise as
/// [`read_snapshot_from`].
pub fn read_snapshot(path: impl AsRef<Path>) -> Result<ChainSnapshot, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    let snapshot = read_snapshot_from(file)?;
    info!(
        path = %path.display(),
        strikes = snapshot.len(),
        expiry = %snapshot.expiry(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

/// Writes `snapshot` in the persisted layout.
pub fn write_snapshot_to<W: io::Write>(writer: W, snapshot: &ChainSnapshot) -> Result<(), LoadError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let expiry = snapshot.expiry().to_string();
    for row in snapshot.rows() {
        wtr.serialize(CsvRow::from_row(snapshot.spot(), &expiry, row))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes `snapshot` to `path`, creating parent directories.
pub fn write_snapshot(path: impl AsRef<Path>, snapshot: &ChainSnapshot) -> Result<(), LoadError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| LoadError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| LoadError::io(path, e))?;
    write_snapshot_to(file, snapshot)?;
    info!(path = %path.display(), strikes = snapshot.len(), "wrote snapshot");
    Ok(())
}

/// Writes strike-indexed exposure columns, three per table
/// (`Call_GEX, Put_GEX, Total_GEX` for gamma and so on).
///
/// Strikes follow the first table; cells are empty where a later table has
/// no row for that strike. Nothing is written for an empty slice.
pub fn write_exposure_csv<W: io::Write>(
    writer: W,
    tables: &[ExposureTable],
) -> Result<(), LoadError> {
    let Some(first) = tables.first() else {
        return Ok(());
    };

    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Strike".to_string()];
    for table in tables {
        let code = table.kind().code().to_uppercase();
        header.push(format!("Call_{code}"));
        header.push(format!("Put_{code}"));
        header.push(format!("Total_{code}"));
    }
    wtr.write_record(&header)?;

    for base in first.rows() {
        let mut record = vec![base.strike.to_string()];
        for table in tables {
            match table.row(base.strike) {
                Some(row) => {
                    record.push(row.call.to_string());
                    record.push(row.put.to_string());
                    record.push(row.total.to_string());
                }
                None => record.extend(std::iter::repeat(String::new()).take(3)),
            }
        }
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gex_analytics::exposure::{compute_exposure, ExposureKind};
    use gex_core::types::Date;

    const LEGACY: &str = "\
Strike,Spot,expiry,Call_OI,Put_OI,call_iv,call_delta,call_gamma,put_iv,put_delta,put_gamma,Total_GEX
24000,24060.5,2025-01-30,1500.0,2200,13.1,0.55,0.0011,13.9,-0.45,0.0010,123.4
24100,24060.5,2025-01-30,900,,12.8,NaN,0.0012,,-0.55,0.0012,-5.0
23900,24060.5,2025-01-30,300,4000,13.5,0.66,,14.2,-0.34,0.0009,
";

    #[test]
    fn test_reads_legacy_layout() {
        let snap = read_snapshot_from(LEGACY.as_bytes()).unwrap();
        assert_eq!(snap.strikes(), vec![23900.0, 24000.0, 24100.0]);
        assert_relative_eq!(snap.spot(), 24060.5);
        assert_eq!(snap.expiry(), Date::from_ymd(2025, 1, 30).unwrap());

        let row = snap.row(24000.0).unwrap();
        assert_eq!(row.call.oi(), 1500);
        assert_eq!(row.put.oi(), 2200);
        assert_eq!(row.call.greek(Greek::Delta), Some(0.55));
        assert_eq!(row.call.volume(), None);
        assert_eq!(row.call.greek(Greek::Vanna), None);
    }

    #[test]
    fn test_empty_and_nan_cells_are_missing() {
        let snap = read_snapshot_from(LEGACY.as_bytes()).unwrap();
        let row = snap.row(24100.0).unwrap();
        assert_eq!(row.put.oi(), 0);
        assert_eq!(row.put.iv(), None);
        assert_eq!(row.call.greek(Greek::Delta), None);
        assert_eq!(snap.row(23900.0).unwrap().call.greek(Greek::Gamma), None);
    }

    #[test]
    fn test_missing_required_column() {
        let text = "Strike,Spot,expiry,Call_OI\n24000,24060,2025-01-30,10\n";
        let err = read_snapshot_from(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column: "Put_OI" }));
    }

    #[test]
    fn test_negative_count_rejected() {
        let text = "Strike,Spot,expiry,Call_OI,Put_OI,put_vol\n24000,24060,2025-01-30,10,5,-3\n";
        let err = read_snapshot_from(text.as_bytes()).unwrap_err();
        match err {
            LoadError::Snapshot(SnapshotError::InvalidCount { field, side, .. }) => {
                assert_eq!(field, "put_vol");
                assert_eq!(side, OptionSide::Put);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fractional_count_rejected() {
        let text = "Strike,Spot,expiry,Call_OI,Put_OI\n24000,24060,2025-01-30,10.5,5\n";
        assert!(matches!(
            read_snapshot_from(text.as_bytes()),
            Err(LoadError::Snapshot(SnapshotError::InvalidCount { .. }))
        ));
    }

    #[test]
    fn test_inconsistent_spot_rejected() {
        let text = "Strike,Spot,expiry,Call_OI,Put_OI\n\
                    24000,24060,2025-01-30,1,1\n\
                    24100,24061,2025-01-30,1,1\n";
        assert!(matches!(
            read_snapshot_from(text.as_bytes()),
            Err(LoadError::Snapshot(SnapshotError::InconsistentSpot { .. }))
        ));
    }

    #[test]
    fn test_garbage_number_is_csv_error() {
        let text = "Strike,Spot,expiry,Call_OI,Put_OI\nabc,24060,2025-01-30,1,1\n";
        assert!(matches!(read_snapshot_from(text.as_bytes()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn test_written_counters_are_integral() {
        let snap = read_snapshot_from(LEGACY.as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_snapshot_to(&mut buf, &snap).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Strike,Spot,expiry,Call_OI,Put_OI,call_iv"));
        assert!(header.ends_with("put_vol,put_prev_oi"));
        assert!(lines.any(|l| l.starts_with("24000.0,24060.5,2025-01-30,1500,2200,")));

        assert_eq!(read_snapshot_from(text.as_bytes()).unwrap(), snap);
    }

    #[test]
    fn test_exposure_columns() {
        let snap = read_snapshot_from(LEGACY.as_bytes()).unwrap();
        let gex = compute_exposure(&snap, 75, ExposureKind::Gamma).unwrap();
        let dex = compute_exposure(&snap, 75, ExposureKind::Delta).unwrap();

        let mut buf = Vec::new();
        write_exposure_csv(&mut buf, &[gex, dex]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Strike,Call_GEX,Put_GEX,Total_GEX,Call_DEX,Put_DEX,Total_DEX"
        );
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("23900,"));
    }

    #[test]
    fn test_exposure_csv_empty_tables() {
        let mut buf = Vec::new();
        write_exposure_csv(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());
    }
}
