//! Exposure Calculator.
//!
//! Every exposure kind shares one shape: per side, a signed product of a
//! vendor Greek, open interest and a kind-specific multiplier; then
//! `total = call + put` and `abs = |total|`.
//!
//! | Kind | Greek | Multiplier | Call sign | Put sign |
//! |------|-------|------------|-----------|----------|
//! | GEX  | gamma | lot · S² · 0.01 | + | − |
//! | DEX  | delta | lot · S         | − | − |
//! | VEX  | vanna | lot · S · 0.01  | + | − |
//! | CEX  | charm | lot · S         | + | − |
//!
//! Missing vendor Greeks contribute zero.

use std::fmt;
use std::str::FromStr;

use gex_core::chain::{or_zero, ChainSnapshot, Greek, StrikeRow};
use gex_core::types::{Component, ComputationError, OptionSide};

/// Greek an exposure table aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExposureKind {
    /// Gamma exposure (GEX), dollars per 1% spot move
    Gamma,
    /// Delta exposure (DEX)
    Delta,
    /// Vanna exposure (VEX)
    Vanna,
    /// Charm exposure (CEX)
    Charm,
}

impl ExposureKind {
    /// All kinds in display order.
    pub const ALL: [ExposureKind; 4] = [
        ExposureKind::Gamma,
        ExposureKind::Delta,
        ExposureKind::Vanna,
        ExposureKind::Charm,
    ];

    /// Short column code (`gex`, `dex`, `vex`, `cex`).
    pub fn code(self) -> &'static str {
        match self {
            ExposureKind::Gamma => "gex",
            ExposureKind::Delta => "dex",
            ExposureKind::Vanna => "vex",
            ExposureKind::Charm => "cex",
        }
    }

    /// Vendor Greek read from each side quote.
    pub fn greek(self) -> Greek {
        match self {
            ExposureKind::Gamma => Greek::Gamma,
            ExposureKind::Delta => Greek::Delta,
            ExposureKind::Vanna => Greek::Vanna,
            ExposureKind::Charm => Greek::Charm,
        }
    }

    /// Scale applied to `greek × oi` for one contract lot at `spot`.
    pub fn multiplier(self, lot_size: u32, spot: f64) -> f64 {
        let lot = f64::from(lot_size);
        match self {
            ExposureKind::Gamma => lot * spot * spot * 0.01,
            ExposureKind::Delta => lot * spot,
            ExposureKind::Vanna => lot * spot * 0.01,
            ExposureKind::Charm => lot * spot,
        }
    }

    /// Dealer-short sign applied to one side.
    ///
    /// Delta exposure negates both sides; the others negate puts only.
    pub fn side_sign(self, side: OptionSide) -> f64 {
        match (self, side) {
            (ExposureKind::Delta, _) => -1.0,
            (_, OptionSide::Call) => 1.0,
            (_, OptionSide::Put) => -1.0,
        }
    }
}

impl fmt::Display for ExposureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExposureKind::Gamma => "gamma",
            ExposureKind::Delta => "delta",
            ExposureKind::Vanna => "vanna",
            ExposureKind::Charm => "charm",
        })
    }
}

impl FromStr for ExposureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gamma" | "gex" => Ok(ExposureKind::Gamma),
            "delta" | "dex" => Ok(ExposureKind::Delta),
            "vanna" | "vex" => Ok(ExposureKind::Vanna),
            "charm" | "cex" => Ok(ExposureKind::Charm),
            other => Err(format!(
                "unknown exposure kind '{other}' (expected gamma, delta, vanna or charm)"
            )),
        }
    }
}

/// Exposure at one strike.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExposureRow {
    /// Strike price
    pub strike: f64,
    /// Signed call-side exposure
    pub call: f64,
    /// Signed put-side exposure
    pub put: f64,
    /// `call + put`
    pub total: f64,
    /// `|total|`
    pub abs: f64,
}

impl ExposureRow {
    fn from_sides(strike: f64, call: f64, put: f64) -> Self {
        let total = call + put;
        Self {
            strike,
            call,
            put,
            total,
            abs: total.abs(),
        }
    }
}

/// Summed exposure across all strikes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExposureTotals {
    /// Sum of call-side exposure
    pub call: f64,
    /// Sum of put-side exposure
    pub put: f64,
    /// Sum of per-strike totals
    pub net: f64,
    /// Sum of per-strike absolute totals
    pub gross: f64,
}

/// A chain snapshot augmented with one kind of per-strike exposure.
///
/// Rows are in ascending strike order, one per snapshot strike.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExposureTable {
    kind: ExposureKind,
    lot_size: u32,
    spot: f64,
    #[cfg_attr(feature = "serde", serde(skip))]
    snapshot: ChainSnapshot,
    rows: Vec<ExposureRow>,
}

impl ExposureTable {
    /// Exposure kind.
    #[inline]
    pub fn kind(&self) -> ExposureKind {
        self.kind
    }

    /// Contract lot size used for the multiplier.
    #[inline]
    pub fn lot_size(&self) -> u32 {
        self.lot_size
    }

    /// Spot of the source snapshot.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Source snapshot.
    #[inline]
    pub fn snapshot(&self) -> &ChainSnapshot {
        &self.snapshot
    }

    /// Per-strike rows in ascending strike order.
    #[inline]
    pub fn rows(&self) -> &[ExposureRow] {
        &self.rows
    }

    /// Row for an exact strike.
    pub fn row(&self, strike: f64) -> Option<&ExposureRow> {
        self.rows.iter().find(|r| r.strike == strike)
    }

    /// Call, put, net and gross sums.
    pub fn totals(&self) -> ExposureTotals {
        self.rows
            .iter()
            .fold(ExposureTotals::default(), |acc, r| ExposureTotals {
                call: acc.call + r.call,
                put: acc.put + r.put,
                net: acc.net + r.total,
                gross: acc.gross + r.abs,
            })
    }
}

impl AsRef<ChainSnapshot> for ExposureTable {
    fn as_ref(&self) -> &ChainSnapshot {
        &self.snapshot
    }
}

fn side_exposure(row: &StrikeRow, side: OptionSide, kind: ExposureKind, multiplier: f64) -> f64 {
    let quote = row.side(side);
    kind.side_sign(side) * or_zero(quote.greek(kind.greek())) * quote.oi() as f64 * multiplier
}

/// Computes one kind of per-strike dealer exposure.
///
/// # Arguments
/// * `snapshot` - Validated chain snapshot
/// * `lot_size` - Contract lot size of the index
/// * `kind` - Exposure kind
///
/// # Errors
/// - `ComputationError::InvalidParameter` if `lot_size` is zero
/// - `ComputationError::NonFinite` if a product overflows
///
/// # Examples
/// ```
/// use gex_analytics::exposure::{compute_exposure, ExposureKind};
/// use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
/// use gex_core::types::Date;
///
/// let expiry = Date::from_ymd(2025, 1, 30).unwrap();
/// let rows = vec![StrikeRow::new(
///     100.0,
///     SideQuote::new(10).with_gamma(0.02),
///     SideQuote::new(4).with_gamma(0.03),
/// )];
/// let snapshot = ChainSnapshot::new(100.0, expiry, rows).unwrap();
///
/// // multiplier = 1 × 100² × 0.01 = 100
/// let gex = compute_exposure(&snapshot, 1, ExposureKind::Gamma).unwrap();
/// let row = gex.rows()[0];
/// assert!((row.call - 20.0).abs() < 1e-9);
/// assert!((row.put + 12.0).abs() < 1e-9);
/// assert!((row.total - 8.0).abs() < 1e-9);
/// ```
pub fn compute_exposure(
    snapshot: &ChainSnapshot,
    lot_size: u32,
    kind: ExposureKind,
) -> Result<ExposureTable, ComputationError> {
    if lot_size == 0 {
        return Err(ComputationError::InvalidParameter {
            component: Component::Exposure,
            name: "lot_size",
            value: 0.0,
        });
    }

    let spot = snapshot.spot();
    let multiplier = kind.multiplier(lot_size, spot);

    let rows = snapshot
        .rows()
        .iter()
        .map(|row| {
            let call = side_exposure(row, OptionSide::Call, kind, multiplier);
            let put = side_exposure(row, OptionSide::Put, kind, multiplier);
            let exposure = ExposureRow::from_sides(row.strike, call, put);
            if exposure.total.is_finite() {
                Ok(exposure)
            } else {
                Err(ComputationError::NonFinite {
                    component: Component::Exposure,
                    quantity: "total exposure",
                    strike: row.strike,
                })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExposureTable {
        kind,
        lot_size,
        spot,
        snapshot: snapshot.clone(),
        rows,
    })
}

/// Computes all four exposure kinds, in [`ExposureKind::ALL`] order.
///
/// # Errors
/// Same as [`compute_exposure`].
pub fn compute_all_exposures(
    snapshot: &ChainSnapshot,
    lot_size: u32,
) -> Result<Vec<ExposureTable>, ComputationError> {
    ExposureKind::ALL
        .iter()
        .map(|&kind| compute_exposure(snapshot, lot_size, kind))
        .collect()
}
