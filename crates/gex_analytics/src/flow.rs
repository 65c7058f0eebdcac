//! Flow Classifier.
//!
//! Diffs two captures of the same chain to approximate whether calls and
//! puts are being bought or sold, using IV change, OI change and
//! incremental volume as proxy signals.
//!
//! Legs are joined on (strike, expiry, side); legs present in only one
//! snapshot are dropped. Missing IV, volume and last price count as zero.
//!
//! | IV change      | OI change | Class             |
//! |----------------|-----------|-------------------|
//! | > +0.002       | > 0       | `BoughtToOpen`    |
//! | > +0.002       | ≤ 0       | `ShortCovered`    |
//! | < −0.002       | > 0       | `SoldToOpen`      |
//! | < −0.002       | ≤ 0       | `BoughtToClose`   |
//! | within ±0.002  | any       | `Neutral`         |
//!
//! A leg with no incremental volume is always `Neutral`.

use std::fmt;

use gex_core::chain::{or_zero, ChainSnapshot, SideQuote};
use gex_core::types::{Component, ComputationError, Date, OptionSide};

/// IV change (in the snapshot's IV units) below which IV is treated as flat.
pub const IV_CHANGE_THRESHOLD: f64 = 0.002;

/// Inferred flow for one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FlowClass {
    /// IV up, OI up
    BoughtToOpen,
    /// IV up, OI flat or down
    ShortCovered,
    /// IV down, OI up
    SoldToOpen,
    /// IV down, OI flat or down
    BoughtToClose,
    /// No volume or no meaningful IV move
    Neutral,
}

impl FlowClass {
    /// Snake-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            FlowClass::BoughtToOpen => "bought_to_open",
            FlowClass::ShortCovered => "short_covered",
            FlowClass::SoldToOpen => "sold_to_open",
            FlowClass::BoughtToClose => "bought_to_close",
            FlowClass::Neutral => "neutral",
        }
    }
}

impl fmt::Display for FlowClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies one leg from its incremental volume, IV change and OI change.
///
/// # Examples
/// ```
/// use gex_analytics::flow::{classify_leg, FlowClass};
///
/// assert_eq!(classify_leg(100, 0.01, 500), FlowClass::BoughtToOpen);
/// assert_eq!(classify_leg(0, 0.01, 500), FlowClass::Neutral);
/// assert_eq!(classify_leg(100, -0.01, 0), FlowClass::BoughtToClose);
/// ```
pub fn classify_leg(incremental_volume: u64, iv_change: f64, oi_change: i64) -> FlowClass {
    if incremental_volume == 0 {
        return FlowClass::Neutral;
    }
    let iv_up = iv_change > IV_CHANGE_THRESHOLD;
    let iv_down = iv_change < -IV_CHANGE_THRESHOLD;
    let oi_up = oi_change > 0;

    match (iv_up, iv_down, oi_up) {
        (true, _, true) => FlowClass::BoughtToOpen,
        (true, _, false) => FlowClass::ShortCovered,
        (_, true, true) => FlowClass::SoldToOpen,
        (_, true, false) => FlowClass::BoughtToClose,
        _ => FlowClass::Neutral,
    }
}

/// Five-bucket reading of net pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowLabel {
    /// pressure > 0.6
    AggressivelyBought,
    /// 0.2 < pressure ≤ 0.6
    LightlyBought,
    /// −0.2 < pressure ≤ 0.2
    NeutralMixed,
    /// −0.6 < pressure ≤ −0.2
    LightlySold,
    /// pressure ≤ −0.6
    AggressivelySold,
}

impl FlowLabel {
    /// Buckets a pressure value in `[−1, 1]`.
    pub fn from_pressure(pressure: f64) -> Self {
        if pressure > 0.6 {
            FlowLabel::AggressivelyBought
        } else if pressure > 0.2 {
            FlowLabel::LightlyBought
        } else if pressure > -0.2 {
            FlowLabel::NeutralMixed
        } else if pressure > -0.6 {
            FlowLabel::LightlySold
        } else {
            FlowLabel::AggressivelySold
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            FlowLabel::AggressivelyBought => "aggressively bought",
            FlowLabel::LightlyBought => "lightly bought",
            FlowLabel::NeutralMixed => "neutral / mixed",
            FlowLabel::LightlySold => "lightly sold",
            FlowLabel::AggressivelySold => "aggressively sold",
        }
    }
}

impl fmt::Display for FlowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One joined leg.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlowRecord {
    /// Strike price
    pub strike: f64,
    /// Shared expiry
    pub expiry: Date,
    /// Call or put
    pub side: OptionSide,
    /// `max(volume_now − volume_prev, 0)`
    pub incremental_volume: u64,
    /// `iv_now − iv_prev`
    pub iv_change: f64,
    /// `oi_now − oi_prev`
    pub oi_change: i64,
    /// Incremental volume relative to the previous OI; `None` when that is zero
    pub vol_intensity: Option<f64>,
    /// Inferred flow
    pub flow_class: FlowClass,
    /// `incremental_volume × ltp_now × lot_size`
    pub dollar_flow: f64,
}

/// Dollar flow by class and net pressure for one side.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SideFlowSummary {
    /// Dollar flow classed `BoughtToOpen`
    pub bought_to_open: f64,
    /// Dollar flow classed `SoldToOpen`
    pub sold_to_open: f64,
    /// Dollar flow classed `BoughtToClose`
    pub bought_to_close: f64,
    /// Dollar flow classed `ShortCovered`
    pub short_covered: f64,
    /// `(buying − selling) / (buying + selling)`, zero without flow
    pub pressure: f64,
    /// Bucketed pressure
    pub label: FlowLabel,
}

impl SideFlowSummary {
    fn from_records<'a>(records: impl Iterator<Item = &'a FlowRecord>) -> Self {
        let (mut bto, mut sto, mut btc, mut sc) = (0.0, 0.0, 0.0, 0.0);
        for r in records {
            match r.flow_class {
                FlowClass::BoughtToOpen => bto += r.dollar_flow,
                FlowClass::SoldToOpen => sto += r.dollar_flow,
                FlowClass::BoughtToClose => btc += r.dollar_flow,
                FlowClass::ShortCovered => sc += r.dollar_flow,
                FlowClass::Neutral => {}
            }
        }
        let buying = bto + sc;
        let selling = sto + btc;
        let total = buying + selling;
        let pressure = if total > 0.0 {
            (buying - selling) / total
        } else {
            0.0
        };
        Self {
            bought_to_open: bto,
            sold_to_open: sto,
            bought_to_close: btc,
            short_covered: sc,
            pressure,
            label: FlowLabel::from_pressure(pressure),
        }
    }

    /// `bought_to_open + short_covered`.
    pub fn buying(&self) -> f64 {
        self.bought_to_open + self.short_covered
    }

    /// `sold_to_open + bought_to_close`.
    pub fn selling(&self) -> f64 {
        self.sold_to_open + self.bought_to_close
    }
}

/// Flow classification of a snapshot pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlowResult {
    /// Call-side summary
    pub calls: SideFlowSummary,
    /// Put-side summary
    pub puts: SideFlowSummary,
    /// Joined legs, ascending strike, calls before puts
    pub records: Vec<FlowRecord>,
}

impl FlowResult {
    /// Summary for one side.
    pub fn side(&self, side: OptionSide) -> &SideFlowSummary {
        match side {
            OptionSide::Call => &self.calls,
            OptionSide::Put => &self.puts,
        }
    }
}

fn join_leg(
    strike: f64,
    expiry: Date,
    side: OptionSide,
    now: &SideQuote,
    prev: &SideQuote,
    lot_size: f64,
) -> FlowRecord {
    let incremental_volume = now
        .volume()
        .unwrap_or(0)
        .saturating_sub(prev.volume().unwrap_or(0));
    let iv_change = or_zero(now.iv()) - or_zero(prev.iv());
    let oi_change = now.oi() as i64 - prev.oi() as i64;
    let vol_intensity = match prev.oi() {
        0 => None,
        oi => Some(incremental_volume as f64 / oi as f64),
    };

    FlowRecord {
        strike,
        expiry,
        side,
        incremental_volume,
        iv_change,
        oi_change,
        vol_intensity,
        flow_class: classify_leg(incremental_volume, iv_change, oi_change),
        dollar_flow: incremental_volume as f64 * or_zero(now.ltp()) * lot_size,
    }
}

/// Classifies flow between two captures of a chain.
///
/// # Arguments
/// * `now` - Later snapshot
/// * `prev` - Earlier snapshot
/// * `lot_size` - Contract lot size used to scale dollar flow
///
/// # Errors
/// `ComputationError::InvalidParameter` if `lot_size` is zero.
///
/// # Examples
/// ```
/// use gex_analytics::flow::{classify_flow, FlowClass, FlowLabel};
/// use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
/// use gex_core::types::Date;
///
/// let expiry = Date::from_ymd(2025, 1, 30).unwrap();
/// let prev = ChainSnapshot::new(24000.0, expiry, vec![StrikeRow::new(
///     24000.0,
///     SideQuote::new(1000).with_iv(12.0).with_volume(Some(5_000)).with_ltp(100.0),
///     SideQuote::new(800).with_iv(13.0).with_volume(Some(2_000)).with_ltp(90.0),
/// )]).unwrap();
/// let now = ChainSnapshot::new(24050.0, expiry, vec![StrikeRow::new(
///     24000.0,
///     SideQuote::new(1500).with_iv(12.5).with_volume(Some(5_100)).with_ltp(120.0),
///     SideQuote::new(800).with_iv(13.0).with_volume(Some(2_000)).with_ltp(70.0),
/// )]).unwrap();
///
/// let flow = classify_flow(&now, &prev, 75).unwrap();
/// assert_eq!(flow.records[0].flow_class, FlowClass::BoughtToOpen);
/// assert_eq!(flow.records[0].dollar_flow, 100.0 * 120.0 * 75.0);
/// assert_eq!(flow.calls.label, FlowLabel::AggressivelyBought);
/// assert_eq!(flow.puts.pressure, 0.0);
/// ```
pub fn classify_flow(
    now: &ChainSnapshot,
    prev: &ChainSnapshot,
    lot_size: u32,
) -> Result<FlowResult, ComputationError> {
    if lot_size == 0 {
        return Err(ComputationError::InvalidParameter {
            component: Component::Flow,
            name: "lot_size",
            value: 0.0,
        });
    }
    let lot = f64::from(lot_size);

    let mut records = Vec::new();
    // Expiry is constant per snapshot, so the expiry key either matches for
    // every strike or for none.
    if now.expiry() == prev.expiry() {
        for row in now.rows() {
            if let Some(prev_row) = prev.row(row.strike) {
                for side in OptionSide::ALL {
                    records.push(join_leg(
                        row.strike,
                        now.expiry(),
                        side,
                        row.side(side),
                        prev_row.side(side),
                        lot,
                    ));
                }
            }
        }
    }

    let summarize = |side: OptionSide| {
        SideFlowSummary::from_records(records.iter().filter(move |r| r.side == side))
    };
    let calls = summarize(OptionSide::Call);
    let puts = summarize(OptionSide::Put);

    Ok(FlowResult {
        calls,
        puts,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gex_core::chain::StrikeRow;

    fn quote(oi: u64, iv: f64, volume: u64, ltp: f64) -> SideQuote {
        SideQuote::new(oi)
            .with_iv(iv)
            .with_volume(Some(volume))
            .with_ltp(ltp)
    }

    fn snapshot(expiry: Date, rows: Vec<StrikeRow>) -> ChainSnapshot {
        ChainSnapshot::new(24000.0, expiry, rows).unwrap()
    }

    fn expiry() -> Date {
        Date::from_ymd(2025, 1, 30).unwrap()
    }

    #[test]
    fn test_decision_table() {
        assert_eq!(classify_leg(100, 0.01, 500), FlowClass::BoughtToOpen);
        assert_eq!(classify_leg(100, 0.01, 0), FlowClass::ShortCovered);
        assert_eq!(classify_leg(100, 0.01, -20), FlowClass::ShortCovered);
        assert_eq!(classify_leg(100, -0.01, 20), FlowClass::SoldToOpen);
        assert_eq!(classify_leg(100, -0.01, -20), FlowClass::BoughtToClose);
        assert_eq!(classify_leg(100, 0.002, 20), FlowClass::Neutral);
        assert_eq!(classify_leg(100, -0.002, -20), FlowClass::Neutral);
    }

    #[test]
    fn test_no_volume_is_neutral() {
        for (iv, oi) in [(0.5, 100), (-0.5, 100), (0.5, -100), (-0.5, -100)] {
            assert_eq!(classify_leg(0, iv, oi), FlowClass::Neutral);
        }
    }

    #[test]
    fn test_volume_reset_is_clamped() {
        let prev = snapshot(
            expiry(),
            vec![StrikeRow::new(24000.0, quote(100, 12.0, 900, 50.0), quote(100, 12.0, 900, 50.0))],
        );
        let now = snapshot(
            expiry(),
            vec![StrikeRow::new(24000.0, quote(200, 13.0, 10, 50.0), quote(200, 13.0, 10, 50.0))],
        );
        let flow = classify_flow(&now, &prev, 75).unwrap();
        assert!(flow.records.iter().all(|r| r.incremental_volume == 0));
        assert!(flow.records.iter().all(|r| r.flow_class == FlowClass::Neutral));
        assert_eq!(flow.calls.label, FlowLabel::NeutralMixed);
    }

    #[test]
    fn test_unmatched_strikes_are_dropped() {
        let prev = snapshot(
            expiry(),
            vec![
                StrikeRow::new(23900.0, quote(1, 1.0, 1, 1.0), quote(1, 1.0, 1, 1.0)),
                StrikeRow::new(24000.0, quote(1, 1.0, 1, 1.0), quote(1, 1.0, 1, 1.0)),
            ],
        );
        let now = snapshot(
            expiry(),
            vec![
                StrikeRow::new(24000.0, quote(1, 1.0, 1, 1.0), quote(1, 1.0, 1, 1.0)),
                StrikeRow::new(24100.0, quote(1, 1.0, 1, 1.0), quote(1, 1.0, 1, 1.0)),
            ],
        );
        let flow = classify_flow(&now, &prev, 75).unwrap();
        assert_eq!(flow.records.len(), 2);
        assert!(flow.records.iter().all(|r| r.strike == 24000.0));
    }

    #[test]
    fn test_different_expiries_do_not_join() {
        let rows = vec![StrikeRow::new(24000.0, quote(1, 1.0, 1, 1.0), quote(1, 1.0, 1, 1.0))];
        let prev = snapshot(expiry(), rows.clone());
        let now = snapshot(Date::from_ymd(2025, 2, 6).unwrap(), rows);
        let flow = classify_flow(&now, &prev, 75).unwrap();
        assert!(flow.records.is_empty());
        assert_eq!(flow.puts.pressure, 0.0);
    }

    #[test]
    fn test_pressure_and_vol_intensity() {
        // calls: bought_to_open 10·2·1 = 20, sold_to_open 10·1·1 = 10
        let prev = snapshot(
            expiry(),
            vec![
                StrikeRow::new(24000.0, quote(100, 12.0, 0, 0.0), quote(0, 12.0, 0, 0.0)),
                StrikeRow::new(24100.0, quote(100, 12.0, 0, 0.0), quote(0, 12.0, 0, 0.0)),
            ],
        );
        let now = snapshot(
            expiry(),
            vec![
                StrikeRow::new(24000.0, quote(110, 12.5, 10, 2.0), quote(5, 12.0, 10, 3.0)),
                StrikeRow::new(24100.0, quote(110, 11.5, 10, 1.0), quote(5, 12.0, 10, 3.0)),
            ],
        );
        let flow = classify_flow(&now, &prev, 1).unwrap();

        assert_relative_eq!(flow.calls.bought_to_open, 20.0);
        assert_relative_eq!(flow.calls.sold_to_open, 10.0);
        assert_relative_eq!(flow.calls.pressure, 10.0 / 30.0, epsilon = 1e-12);
        assert_eq!(flow.calls.label, FlowLabel::LightlyBought);
        assert_relative_eq!(flow.calls.buying() - flow.calls.selling(), 10.0);

        let call = flow.records[0];
        assert_eq!(call.side, OptionSide::Call);
        assert_relative_eq!(call.vol_intensity.unwrap(), 0.1);
        let put = flow.records[1];
        assert_eq!(put.vol_intensity, None);
        // IV flat → neutral even with volume
        assert_eq!(put.flow_class, FlowClass::Neutral);
        assert_eq!(flow.side(OptionSide::Put).pressure, 0.0);
    }

    #[test]
    fn test_missing_fields_count_as_zero() {
        let prev = snapshot(
            expiry(),
            vec![StrikeRow::new(24000.0, SideQuote::new(10), SideQuote::new(10))],
        );
        let now = snapshot(
            expiry(),
            vec![StrikeRow::new(
                24000.0,
                SideQuote::new(20).with_iv(1.0).with_volume(Some(7)),
                SideQuote::new(10),
            )],
        );
        let flow = classify_flow(&now, &prev, 75).unwrap();
        let call = flow.records[0];
        assert_eq!(call.incremental_volume, 7);
        assert_eq!(call.iv_change, 1.0);
        assert_eq!(call.flow_class, FlowClass::BoughtToOpen);
        assert_eq!(call.dollar_flow, 0.0);
    }

    #[test]
    fn test_label_buckets() {
        assert_eq!(FlowLabel::from_pressure(0.61), FlowLabel::AggressivelyBought);
        assert_eq!(FlowLabel::from_pressure(0.6), FlowLabel::LightlyBought);
        assert_eq!(FlowLabel::from_pressure(0.2), FlowLabel::NeutralMixed);
        assert_eq!(FlowLabel::from_pressure(-0.2), FlowLabel::LightlySold);
        assert_eq!(FlowLabel::from_pressure(-0.6), FlowLabel::AggressivelySold);
        assert_eq!(FlowLabel::NeutralMixed.to_string(), "neutral / mixed");
    }

    #[test]
    fn test_zero_lot_size_rejected() {
        let snap = snapshot(
            expiry(),
            vec![StrikeRow::new(24000.0, SideQuote::new(1), SideQuote::new(1))],
        );
        assert!(matches!(
            classify_flow(&snap, &snap, 0),
            Err(ComputationError::InvalidParameter { component: Component::Flow, .. })
        ));
    }
}
