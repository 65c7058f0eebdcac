//! Vol Surface Calculator: 25-delta risk reversal and 10-delta butterfly.
//!
//! - RR25 = IV(25Δ call) − IV(25Δ put)
//! - BF10 = ½·(IV(10Δ call) + IV(10Δ put)) − IV(ATM)
//!
//! Rows are picked by nearest vendor delta (calls against +0.50, +0.25,
//! +0.10; puts against −0.25, −0.10). IVs stay in the snapshot's
//! percentage units, so RR25 and BF10 are in vol points.

use std::fmt;

use gex_core::chain::{ChainSnapshot, Greek};
use gex_core::types::{Component, ComputationError, OptionSide};

/// Sentiment implied by the sign of RR25.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkewSentiment {
    /// Calls richer than puts
    Bullish,
    /// Puts richer than calls
    Bearish,
    /// No skew
    Neutral,
}

impl SkewSentiment {
    /// Classifies a risk reversal with strict thresholds at zero.
    pub fn from_risk_reversal(rr: f64) -> Self {
        if rr > 0.0 {
            SkewSentiment::Bullish
        } else if rr < 0.0 {
            SkewSentiment::Bearish
        } else {
            SkewSentiment::Neutral
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            SkewSentiment::Bullish => "Bullish",
            SkewSentiment::Bearish => "Bearish",
            SkewSentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SkewSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sentiment implied by the sign of BF10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WingSentiment {
    /// Wings priced above ATM
    TailsExpensive,
    /// Wings priced below ATM
    FlatControl,
    /// No convexity premium
    Neutral,
}

impl WingSentiment {
    /// Classifies a butterfly with strict thresholds at zero.
    pub fn from_butterfly(bf: f64) -> Self {
        if bf > 0.0 {
            WingSentiment::TailsExpensive
        } else if bf < 0.0 {
            WingSentiment::FlatControl
        } else {
            WingSentiment::Neutral
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            WingSentiment::TailsExpensive => "Tails Expensive",
            WingSentiment::FlatControl => "Flat/Control",
            WingSentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for WingSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A selected point of the smile.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SmilePoint {
    /// Strike of the selected row
    pub strike: f64,
    /// Vendor delta of the selected side
    pub delta: f64,
    /// IV of the selected side (percentage units)
    pub iv: f64,
}

/// Skew metrics and the rows they were read from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VolSurfaceResult {
    /// Call row nearest +0.50 delta
    pub atm: SmilePoint,
    /// Call row nearest +0.25 delta
    pub call_25: SmilePoint,
    /// Put row nearest −0.25 delta
    pub put_25: SmilePoint,
    /// Call row nearest +0.10 delta
    pub call_10: SmilePoint,
    /// Put row nearest −0.10 delta
    pub put_10: SmilePoint,
    /// 25-delta risk reversal
    pub rr25: f64,
    /// 10-delta butterfly
    pub bf10: f64,
    /// Sign of `rr25`
    pub rr_sentiment: SkewSentiment,
    /// Sign of `bf10`
    pub bf_sentiment: WingSentiment,
}

/// Row whose `side` delta is nearest `target`; ties go to the lower strike.
fn select(
    snapshot: &ChainSnapshot,
    side: OptionSide,
    target: f64,
) -> Result<SmilePoint, ComputationError> {
    let mut best: Option<(f64, f64, Option<f64>)> = None;
    let mut best_dist = f64::INFINITY;
    for row in snapshot.rows() {
        let quote = row.side(side);
        if let Some(delta) = quote.greek(Greek::Delta) {
            let dist = (delta - target).abs();
            if dist < best_dist {
                best_dist = dist;
                best = Some((row.strike, delta, quote.iv()));
            }
        }
    }

    let (strike, delta, iv) = best.ok_or_else(|| ComputationError::MissingData {
        component: Component::VolSurface,
        what: format!("no {side} delta in snapshot"),
    })?;
    let iv = iv.ok_or_else(|| ComputationError::MissingData {
        component: Component::VolSurface,
        what: format!("{side} IV at strike {strike} (selected for delta {target})"),
    })?;
    Ok(SmilePoint { strike, delta, iv })
}

/// Computes RR25 and BF10 from the snapshot's vendor deltas and IVs.
///
/// # Errors
/// `ComputationError::MissingData` when a side carries no delta at all, or
/// when a selected row has no IV on that side.
///
/// # Examples
/// ```
/// use gex_analytics::vol_surface::{compute_vol_surface, SkewSentiment};
/// use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
/// use gex_core::types::Date;
///
/// let expiry = Date::from_ymd(2025, 1, 30).unwrap();
/// let row = |k: f64, cd: f64, civ: f64, pd: f64, piv: f64| {
///     StrikeRow::new(
///         k,
///         SideQuote::new(1).with_delta(cd).with_iv(civ),
///         SideQuote::new(1).with_delta(pd).with_iv(piv),
///     )
/// };
/// let rows = vec![
///     row(90.0, 0.90, 15.0, -0.10, 18.0),
///     row(95.0, 0.75, 14.0, -0.25, 16.0),
///     row(100.0, 0.50, 13.0, -0.50, 13.0),
///     row(105.0, 0.25, 12.5, -0.75, 14.0),
///     row(110.0, 0.10, 13.0, -0.90, 15.0),
/// ];
/// let snapshot = ChainSnapshot::new(100.0, expiry, rows).unwrap();
///
/// let vs = compute_vol_surface(&snapshot).unwrap();
/// assert!((vs.rr25 - (12.5 - 16.0)).abs() < 1e-12);
/// assert!((vs.bf10 - (0.5 * (13.0 + 18.0) - 13.0)).abs() < 1e-12);
/// assert_eq!(vs.rr_sentiment, SkewSentiment::Bearish);
/// ```
pub fn compute_vol_surface(snapshot: &ChainSnapshot) -> Result<VolSurfaceResult, ComputationError> {
    let atm = select(snapshot, OptionSide::Call, 0.50)?;
    let call_25 = select(snapshot, OptionSide::Call, 0.25)?;
    let put_25 = select(snapshot, OptionSide::Put, -0.25)?;
    let call_10 = select(snapshot, OptionSide::Call, 0.10)?;
    let put_10 = select(snapshot, OptionSide::Put, -0.10)?;

    let rr25 = call_25.iv - put_25.iv;
    let bf10 = 0.5 * (call_10.iv + put_10.iv) - atm.iv;

    Ok(VolSurfaceResult {
        atm,
        call_25,
        put_25,
        call_10,
        put_10,
        rr25,
        bf10,
        rr_sentiment: SkewSentiment::from_risk_reversal(rr25),
        bf_sentiment: WingSentiment::from_butterfly(bf10),
    })
}
