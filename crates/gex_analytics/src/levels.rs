//! Key Level Detector.
//!
//! Scalar and structural levels derived from a gamma exposure table:
//! - `atm_strike`: strike nearest spot
//! - `flip_point`: strike whose cumulative net exposure is closest to zero
//! - `dealer_regime`: long gamma above the flip point, short gamma below
//! - gamma cage / vacuum: strikes within / beyond `cage_width` strike steps of ATM
//! - `power_zones`: strikes with the largest absolute exposure
//!
//! The flip point is a nearest-bar answer and is always an actual strike.
//! The Quant Power Model offers an interpolated crossing for callers that
//! need sub-strike precision.

use std::fmt;

use gex_core::chain::ChainSnapshot;
use gex_core::types::{Component, ComputationError};

use crate::exposure::{ExposureKind, ExposureTable};

/// Nominal strike spacing for index chains.
pub const DEFAULT_STRIKE_STEP: f64 = 50.0;

/// Default gamma cage half-width in strike steps.
pub const DEFAULT_CAGE_WIDTH: u32 = 4;

/// Default number of power zones.
pub const DEFAULT_TOP_N: usize = 3;

/// How the strike spacing behind the gamma cage half-width is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StrikeStep {
    /// A configured nominal spacing.
    Fixed(f64),
    /// The minimum gap between consecutive strikes; `fallback` when the
    /// chain has a single strike.
    Observed {
        /// Spacing used when no gap can be observed
        fallback: f64,
    },
}

impl Default for StrikeStep {
    fn default() -> Self {
        StrikeStep::Fixed(DEFAULT_STRIKE_STEP)
    }
}

impl StrikeStep {
    /// Spacing to use for `snapshot`.
    pub fn resolve(self, snapshot: &ChainSnapshot) -> f64 {
        match self {
            StrikeStep::Fixed(step) => step,
            StrikeStep::Observed { fallback } => snapshot.min_strike_gap().unwrap_or(fallback),
        }
    }

    fn configured(self) -> f64 {
        match self {
            StrikeStep::Fixed(step) => step,
            StrikeStep::Observed { fallback } => fallback,
        }
    }
}

/// Key level detector settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyLevelConfig {
    /// Gamma cage half-width in strike steps
    pub cage_width: u32,
    /// Number of power zones to report
    pub top_n: usize,
    /// Strike spacing source
    pub strike_step: StrikeStep,
}

impl Default for KeyLevelConfig {
    fn default() -> Self {
        Self {
            cage_width: DEFAULT_CAGE_WIDTH,
            top_n: DEFAULT_TOP_N,
            strike_step: StrikeStep::default(),
        }
    }
}

/// Dealer hedging regime relative to the flip point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum DealerRegime {
    /// Spot above the flip point: dealer hedging dampens moves.
    LongGamma,
    /// Spot at or below the flip point: dealer hedging amplifies moves.
    ShortGamma,
}

impl DealerRegime {
    /// Regime label.
    pub fn label(self) -> &'static str {
        match self {
            DealerRegime::LongGamma => "LONG GAMMA",
            DealerRegime::ShortGamma => "SHORT GAMMA",
        }
    }

    /// Expected price behaviour under this regime.
    pub fn behaviour(self) -> &'static str {
        match self {
            DealerRegime::LongGamma => "MEAN REVERSION",
            DealerRegime::ShortGamma => "TREND/MOMENTUM",
        }
    }
}

impl fmt::Display for DealerRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.label(), self.behaviour())
    }
}

/// Strikes inside the gamma cage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GammaCage {
    /// Lower bound (inclusive)
    pub low: f64,
    /// Upper bound (inclusive)
    pub high: f64,
    /// Strikes within `[low, high]`, ascending
    pub strikes: Vec<f64>,
}

/// Levels derived from one gamma exposure table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KeyLevels {
    /// Spot of the source snapshot
    pub spot: f64,
    /// Strike nearest spot
    pub atm_strike: f64,
    /// Strike whose cumulative net GEX is closest to zero
    pub flip_point: f64,
    /// Regime implied by spot versus flip point
    pub regime: DealerRegime,
    /// Strike spacing used for the cage half-width
    pub strike_step: f64,
    /// Gamma cage around ATM
    pub cage: GammaCage,
    /// Strikes outside the cage, ascending
    pub vacuum: Vec<f64>,
    /// Strikes with the largest absolute GEX, largest first
    pub power_zones: Vec<f64>,
}

/// Strike minimizing `|strike − spot|`; ties go to the lower strike.
pub fn atm_strike(snapshot: &ChainSnapshot) -> f64 {
    snapshot.nearest_strike(snapshot.spot())
}

/// Strike whose running sum of `total` exposure, in ascending strike
/// order, has the smallest magnitude.
///
/// Ties go to the lower strike.
///
/// # Examples
/// ```
/// use gex_analytics::exposure::{compute_exposure, ExposureKind};
/// use gex_analytics::levels::flip_point;
/// use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
/// use gex_core::types::Date;
///
/// let expiry = Date::from_ymd(2025, 1, 30).unwrap();
/// // Net GEX per strike: −3, +1, +2  →  cumulative: −3, −2, 0
/// let rows = vec![
///     StrikeRow::new(90.0, SideQuote::new(0), SideQuote::new(3).with_gamma(0.01)),
///     StrikeRow::new(100.0, SideQuote::new(1).with_gamma(0.01), SideQuote::new(0)),
///     StrikeRow::new(110.0, SideQuote::new(2).with_gamma(0.01), SideQuote::new(0)),
/// ];
/// let snapshot = ChainSnapshot::new(100.0, expiry, rows).unwrap();
/// let gex = compute_exposure(&snapshot, 1, ExposureKind::Gamma).unwrap();
/// assert_eq!(flip_point(&gex), 110.0);
/// ```
pub fn flip_point(table: &ExposureTable) -> f64 {
    let mut cumulative = 0.0;
    let mut best_strike = f64::NAN;
    let mut best_abs = f64::INFINITY;
    for row in table.rows() {
        cumulative += row.total;
        if cumulative.abs() < best_abs {
            best_abs = cumulative.abs();
            best_strike = row.strike;
        }
    }
    best_strike
}

/// `LongGamma` when spot is strictly above the flip point.
pub fn dealer_regime(spot: f64, flip_point: f64) -> DealerRegime {
    if spot > flip_point {
        DealerRegime::LongGamma
    } else {
        DealerRegime::ShortGamma
    }
}

/// Splits strikes into the cage `|strike − atm| ≤ half_width` and the
/// vacuum beyond it.
pub fn gamma_cage(snapshot: &ChainSnapshot, atm: f64, half_width: f64) -> (GammaCage, Vec<f64>) {
    let low = atm - half_width;
    let high = atm + half_width;
    let (inside, outside): (Vec<f64>, Vec<f64>) = snapshot
        .strikes()
        .into_iter()
        .partition(|&k| k >= low && k <= high);
    (
        GammaCage {
            low,
            high,
            strikes: inside,
        },
        outside,
    )
}

/// The `n` strikes with the largest `abs` exposure, largest first.
///
/// Equal exposures keep ascending strike order.
pub fn power_zones(table: &ExposureTable, n: usize) -> Vec<f64> {
    let mut rows: Vec<_> = table.rows().iter().collect();
    rows.sort_by(|a, b| b.abs.total_cmp(&a.abs));
    rows.into_iter().take(n).map(|r| r.strike).collect()
}

/// Detects key levels with a fixed 50-point strike step.
///
/// # Errors
/// See [`detect_key_levels_with`].
pub fn detect_key_levels(
    table: &ExposureTable,
    cage_width: u32,
    top_n: usize,
) -> Result<KeyLevels, ComputationError> {
    detect_key_levels_with(
        table,
        &KeyLevelConfig {
            cage_width,
            top_n,
            ..KeyLevelConfig::default()
        },
    )
}

/// Detects key levels from a gamma exposure table.
///
/// # Errors
/// - `ComputationError::WrongExposureKind` if `table` is not GEX
/// - `ComputationError::InvalidParameter` if the configured strike step is
///   not finite and positive
pub fn detect_key_levels_with(
    table: &ExposureTable,
    config: &KeyLevelConfig,
) -> Result<KeyLevels, ComputationError> {
    if table.kind() != ExposureKind::Gamma {
        return Err(ComputationError::WrongExposureKind {
            component: Component::KeyLevels,
            expected: ExposureKind::Gamma.code(),
            found: table.kind().code(),
        });
    }
    let configured = config.strike_step.configured();
    if !(configured.is_finite() && configured > 0.0) {
        return Err(ComputationError::InvalidParameter {
            component: Component::KeyLevels,
            name: "strike_step",
            value: configured,
        });
    }

    let snapshot = table.snapshot();
    let spot = snapshot.spot();
    let atm = atm_strike(snapshot);
    let flip = flip_point(table);
    let step = config.strike_step.resolve(snapshot);
    let (cage, vacuum) = gamma_cage(snapshot, atm, f64::from(config.cage_width) * step);

    Ok(KeyLevels {
        spot,
        atm_strike: atm,
        flip_point: flip,
        regime: dealer_regime(spot, flip),
        strike_step: step,
        cage,
        vacuum,
        power_zones: power_zones(table, config.top_n),
    })
}
