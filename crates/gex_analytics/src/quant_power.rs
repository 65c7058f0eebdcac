//! Quant Power Model.
//!
//! Locates the strike where cumulative dealer delta crosses zero, using
//! Greeks recomputed from each leg's implied volatility, and a ±1σ "power
//! zone" around the centroid of blended gamma/vanna exposure.
//!
//! ## Algorithm
//!
//! 1. For every (strike, side) leg recompute `(delta, gamma, vanna)` with
//!    Black-Scholes at the snapshot spot, the configured rate and the leg's
//!    IV. Vendor delta and gamma win where present; vanna is always the
//!    recomputed value; anything still missing is zero.
//! 2. Dealer delta per leg: `−delta × oi × contract_size`.
//! 3. Blended exposure per leg:
//!    `sign × ((1 − w)·gamma·oi·cs·S²·0.01 + w·vanna·oi·cs·S·0.01)`.
//! 4. Sum both per strike and accumulate dealer delta in ascending strike
//!    order.
//! 5. The first sign change of the cumulative series is linearly
//!    interpolated and snapped to the nearest strike; without a sign change
//!    the strike of smallest `|cumulative|` is used.
//! 6. Power zone: `|blended|`-weighted mean ± standard deviation of strike,
//!    each snapped to the nearest strike. Zero total weight falls back to
//!    spot ± 1%.

use gex_core::chain::{ChainSnapshot, Greek, SideQuote};
use gex_core::greeks::{bs_greeks, time_to_expiry, BsGreeks};
use gex_core::types::{Component, ComputationError, Date, OptionSide};

/// Default risk-free rate.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;

/// Default weight of vanna exposure in the blend.
pub const DEFAULT_VANNA_WEIGHT: f64 = 0.3;

/// Quant Power Model inputs besides the snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuantPowerParams {
    /// Risk-free rate used for recomputed Greeks
    pub risk_free_rate: f64,
    /// Vanna weight `w` in `[0, 1]`
    pub vanna_weight: f64,
    /// Contract lot size
    pub contract_size: u32,
    /// Date time-to-expiry is measured from
    pub valuation_date: Date,
}

impl QuantPowerParams {
    /// Default rate and weight for the given lot size and valuation date.
    pub fn new(contract_size: u32, valuation_date: Date) -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            vanna_weight: DEFAULT_VANNA_WEIGHT,
            contract_size,
            valuation_date,
        }
    }

    /// Sets the risk-free rate.
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Sets the vanna weight.
    pub fn with_vanna_weight(mut self, weight: f64) -> Self {
        self.vanna_weight = weight;
        self
    }

    fn validate(&self) -> Result<(), ComputationError> {
        let invalid = |name, value| ComputationError::InvalidParameter {
            component: Component::QuantPower,
            name,
            value,
        };
        if !self.risk_free_rate.is_finite() {
            return Err(invalid("risk_free_rate", self.risk_free_rate));
        }
        if !(0.0..=1.0).contains(&self.vanna_weight) {
            return Err(invalid("vanna_weight", self.vanna_weight));
        }
        if self.contract_size == 0 {
            return Err(invalid("contract_size", 0.0));
        }
        Ok(())
    }
}

/// Per-strike series behind the result.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QuantPowerPoint {
    /// Strike price
    pub strike: f64,
    /// Blended gamma/vanna exposure
    pub blended: f64,
    /// Net dealer delta at this strike
    pub dealer_delta: f64,
    /// Running sum of dealer delta up to and including this strike
    pub cumulative_delta: f64,
}

/// Output of the Quant Power Model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QuantPowerResult {
    /// Strike where cumulative dealer delta crosses zero
    pub quant_power_strike: f64,
    /// Interpolated crossing price before snapping, when a sign change exists
    pub crossing: Option<f64>,
    /// Lower power zone bound (a strike)
    pub power_zone_lower: f64,
    /// Upper power zone bound (a strike)
    pub power_zone_upper: f64,
    /// Per-strike series, ascending
    pub points: Vec<QuantPowerPoint>,
}

/// Greeks for one leg: vendor delta/gamma where present, recomputed vanna.
fn leg_greeks(
    quote: &SideQuote,
    side: OptionSide,
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
) -> BsGreeks {
    let model = quote
        .iv_decimal()
        .map(|vol| bs_greeks(spot, strike, expiry, rate, vol, side))
        .unwrap_or(BsGreeks::ZERO);
    BsGreeks {
        delta: quote.greek(Greek::Delta).unwrap_or(model.delta),
        gamma: quote.greek(Greek::Gamma).unwrap_or(model.gamma),
        vanna: model.vanna,
    }
}

fn has_delta_source(quote: &SideQuote) -> bool {
    quote.greek(Greek::Delta).is_some() || quote.iv().is_some_and(|iv| iv > 0.0)
}

#[inline]
fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Runs the Quant Power Model.
///
/// Accepts a snapshot or anything that wraps one, such as an exposure table.
///
/// # Errors
/// - `ComputationError::InvalidParameter` for a non-finite rate, a vanna
///   weight outside `[0, 1]` or a zero contract size
/// - `ComputationError::MissingData` when no leg has a vendor delta or a
///   positive IV, since dealer delta would be identically zero
/// - `ComputationError::NonFinite` if an intermediate overflows
///
/// # Examples
/// ```
/// use gex_analytics::quant_power::{compute_quant_power, QuantPowerParams};
/// use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
/// use gex_core::types::Date;
///
/// let expiry = Date::from_ymd(2025, 1, 30).unwrap();
/// let rows = [23900.0, 24000.0, 24100.0, 24200.0]
///     .into_iter()
///     .map(|k| StrikeRow::new(k, SideQuote::new(1000).with_iv(13.0), SideQuote::new(1000).with_iv(14.0)))
///     .collect();
/// let snapshot = ChainSnapshot::new(24060.0, expiry, rows).unwrap();
///
/// let params = QuantPowerParams::new(75, Date::from_ymd(2025, 1, 23).unwrap());
/// let result = compute_quant_power(&snapshot, &params).unwrap();
/// assert!(snapshot.strikes().contains(&result.quant_power_strike));
/// assert!(result.power_zone_lower <= result.power_zone_upper);
/// ```
pub fn compute_quant_power<S>(
    source: &S,
    params: &QuantPowerParams,
) -> Result<QuantPowerResult, ComputationError>
where
    S: AsRef<ChainSnapshot> + ?Sized,
{
    params.validate()?;
    let snapshot = source.as_ref();

    if !snapshot
        .rows()
        .iter()
        .any(|row| has_delta_source(&row.call) || has_delta_source(&row.put))
    {
        return Err(ComputationError::MissingData {
            component: Component::QuantPower,
            what: "no leg carries a delta or a positive implied volatility".to_string(),
        });
    }

    let spot = snapshot.spot();
    let t = time_to_expiry(snapshot.expiry(), params.valuation_date);
    let cs = f64::from(params.contract_size);
    let w = params.vanna_weight;

    let mut points = Vec::with_capacity(snapshot.len());
    let mut cumulative = 0.0;
    for row in snapshot.rows() {
        let mut dealer_delta = 0.0;
        let mut blended = 0.0;
        for side in OptionSide::ALL {
            let quote = row.side(side);
            let g = leg_greeks(quote, side, spot, row.strike, t, params.risk_free_rate);
            let oi = quote.oi() as f64;

            dealer_delta += -g.delta * oi * cs;
            let gamma_term = g.gamma * oi * cs * spot * spot * 0.01;
            let vanna_term = g.vanna * oi * cs * spot * 0.01;
            blended += side.sign() * ((1.0 - w) * gamma_term + w * vanna_term);
        }
        cumulative += dealer_delta;

        for (quantity, value) in [
            ("dealer delta", cumulative),
            ("blended exposure", blended),
        ] {
            if !value.is_finite() {
                return Err(ComputationError::NonFinite {
                    component: Component::QuantPower,
                    quantity,
                    strike: row.strike,
                });
            }
        }

        points.push(QuantPowerPoint {
            strike: row.strike,
            blended,
            dealer_delta,
            cumulative_delta: cumulative,
        });
    }

    let (quant_power_strike, crossing) = zero_crossing(snapshot, &points);
    let (power_zone_lower, power_zone_upper) = power_zone(snapshot, &points);

    Ok(QuantPowerResult {
        quant_power_strike,
        crossing,
        power_zone_lower,
        power_zone_upper,
        points,
    })
}

fn zero_crossing(snapshot: &ChainSnapshot, points: &[QuantPowerPoint]) -> (f64, Option<f64>) {
    let first_change = points
        .windows(2)
        .find(|w| sign(w[0].cumulative_delta) != sign(w[1].cumulative_delta));

    match first_change {
        Some(pair) => {
            let (s0, s1) = (pair[0].strike, pair[1].strike);
            let (d0, d1) = (pair[0].cumulative_delta, pair[1].cumulative_delta);
            if d1 == d0 {
                (s0, None)
            } else {
                let price = s0 + (s1 - s0) * (-d0) / (d1 - d0);
                (snapshot.nearest_strike(price), Some(price))
            }
        }
        None => {
            let mut best = points[0];
            for p in &points[1..] {
                if p.cumulative_delta.abs() < best.cumulative_delta.abs() {
                    best = *p;
                }
            }
            (best.strike, None)
        }
    }
}

fn power_zone(snapshot: &ChainSnapshot, points: &[QuantPowerPoint]) -> (f64, f64) {
    let total: f64 = points.iter().map(|p| p.blended.abs()).sum();

    let (mean, std) = if total > 0.0 {
        let mean = points
            .iter()
            .map(|p| p.strike * p.blended.abs())
            .sum::<f64>()
            / total;
        let var = points
            .iter()
            .map(|p| (p.strike - mean).powi(2) * p.blended.abs())
            .sum::<f64>()
            / total;
        (mean, var.sqrt())
    } else {
        let spot = snapshot.spot();
        (spot, spot * 0.01)
    };

    (
        snapshot.nearest_strike(mean - std),
        snapshot.nearest_strike(mean + std),
    )
}
