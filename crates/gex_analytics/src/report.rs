//! Combined market-structure report.
//!
//! One call that runs the Exposure Calculator, Key Level Detector and Quant
//! Power Model over a snapshot and flattens the headline numbers.

use gex_core::chain::ChainSnapshot;
use gex_core::types::{ComputationError, Date};

use crate::exposure::{compute_exposure, ExposureKind};
use crate::filter::DEFAULT_STRIKE_RADIUS;
use crate::levels::{
    detect_key_levels_with, DealerRegime, KeyLevelConfig, StrikeStep, DEFAULT_CAGE_WIDTH,
    DEFAULT_TOP_N,
};
use crate::quant_power::{
    compute_quant_power, QuantPowerParams, DEFAULT_RISK_FREE_RATE, DEFAULT_VANNA_WEIGHT,
};

/// Analytics settings shared by every component.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalyticsParams {
    /// Risk-free rate for recomputed Greeks
    pub risk_free_rate: f64,
    /// Vanna weight in the quant power blend
    pub vanna_weight: f64,
    /// Gamma cage half-width in strike steps
    pub cage_width: u32,
    /// Number of power zones
    pub top_n: usize,
    /// Strike window radius
    pub strike_radius: usize,
    /// Strike spacing source for the cage
    pub strike_step: StrikeStep,
    /// Valuation date for time-to-expiry
    pub valuation_date: Date,
}

impl AnalyticsParams {
    /// Default settings valued at `valuation_date`.
    pub fn new(valuation_date: Date) -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            vanna_weight: DEFAULT_VANNA_WEIGHT,
            cage_width: DEFAULT_CAGE_WIDTH,
            top_n: DEFAULT_TOP_N,
            strike_radius: DEFAULT_STRIKE_RADIUS,
            strike_step: StrikeStep::default(),
            valuation_date,
        }
    }

    /// Key level detector settings.
    pub fn key_levels(&self) -> KeyLevelConfig {
        KeyLevelConfig {
            cage_width: self.cage_width,
            top_n: self.top_n,
            strike_step: self.strike_step,
        }
    }

    /// Quant Power Model settings for a lot size.
    pub fn quant_power(&self, contract_size: u32) -> QuantPowerParams {
        QuantPowerParams::new(contract_size, self.valuation_date)
            .with_risk_free_rate(self.risk_free_rate)
            .with_vanna_weight(self.vanna_weight)
    }
}

/// Gamma cage bounds and population.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CageSummary {
    /// Lower bound
    pub low: f64,
    /// Upper bound
    pub high: f64,
    /// Number of strikes inside
    pub size: usize,
}

/// Headline market-structure numbers for one snapshot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MarketStructure {
    /// Spot
    pub spot: f64,
    /// Expiry
    pub expiry: Date,
    /// ATM strike
    pub atm: f64,
    /// Zero-gamma flip strike
    pub flip_point: f64,
    /// Dealer regime
    pub regime: DealerRegime,
    /// Quant power strike
    pub quant_power: f64,
    /// Gamma cage
    pub cage: CageSummary,
    /// Number of strikes outside the cage
    pub vacuum_size: usize,
    /// Strikes with the largest absolute GEX
    pub power_zones: Vec<f64>,
}

/// Runs GEX, key levels and quant power over `snapshot`.
///
/// # Errors
/// Propagates the first component failure.
pub fn market_structure(
    snapshot: &ChainSnapshot,
    lot_size: u32,
    params: &AnalyticsParams,
) -> Result<MarketStructure, ComputationError> {
    let gex = compute_exposure(snapshot, lot_size, ExposureKind::Gamma)?;
    let levels = detect_key_levels_with(&gex, &params.key_levels())?;
    let qp = compute_quant_power(&gex, &params.quant_power(lot_size))?;

    Ok(MarketStructure {
        spot: levels.spot,
        expiry: snapshot.expiry(),
        atm: levels.atm_strike,
        flip_point: levels.flip_point,
        regime: levels.regime,
        quant_power: qp.quant_power_strike,
        cage: CageSummary {
            low: levels.cage.low,
            high: levels.cage.high,
            size: levels.cage.strikes.len(),
        },
        vacuum_size: levels.vacuum.len(),
        power_zones: levels.power_zones,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gex_core::chain::{SideQuote, StrikeRow};
    use gex_core::types::{Component, OptionSide};

    fn chain() -> ChainSnapshot {
        let spot = 24060.0;
        let t = 7.0 / 365.0;
        let rows = (0..21)
            .map(|i| {
                let k = 23550.0 + 50.0 * i as f64;
                let call = gex_core::greeks::bs_greeks(spot, k, t, 0.05, 0.13, OptionSide::Call);
                let put = gex_core::greeks::bs_greeks(spot, k, t, 0.05, 0.14, OptionSide::Put);
                let call_oi = 1000 + 150 * i as u64;
                let put_oi = 4000 - 150 * i as u64;
                StrikeRow::new(
                    k,
                    SideQuote::new(call_oi)
                        .with_iv(13.0)
                        .with_delta(call.delta)
                        .with_gamma(call.gamma),
                    SideQuote::new(put_oi)
                        .with_iv(14.0)
                        .with_delta(put.delta)
                        .with_gamma(put.gamma),
                )
            })
            .collect();
        ChainSnapshot::new(spot, Date::from_ymd(2025, 1, 30).unwrap(), rows).unwrap()
    }

    fn params() -> AnalyticsParams {
        AnalyticsParams::new(Date::from_ymd(2025, 1, 23).unwrap())
    }

    #[test]
    fn test_market_structure_is_consistent() {
        let snap = chain();
        let ms = market_structure(&snap, 75, &params()).unwrap();
        let strikes = snap.strikes();

        assert_eq!(ms.atm, 24050.0);
        assert!(strikes.contains(&ms.flip_point));
        assert!(strikes.contains(&ms.quant_power));
        assert_eq!(ms.cage.low, 23850.0);
        assert_eq!(ms.cage.high, 24250.0);
        assert_eq!(ms.cage.size + ms.vacuum_size, strikes.len());
        assert_eq!(ms.power_zones.len(), 3);
        assert_eq!(ms.regime, if ms.spot > ms.flip_point {
            DealerRegime::LongGamma
        } else {
            DealerRegime::ShortGamma
        });
    }

    #[test]
    fn test_quant_power_failure_propagates() {
        let mut p = params();
        p.vanna_weight = 2.0;
        let err = market_structure(&chain(), 75, &p).unwrap_err();
        assert_eq!(err.component(), Component::QuantPower);
    }

    #[test]
    fn test_params_mapping() {
        let p = params();
        let qp = p.quant_power(25);
        assert_eq!(qp.contract_size, 25);
        assert_eq!(qp.vanna_weight, DEFAULT_VANNA_WEIGHT);
        assert_eq!(p.key_levels(), KeyLevelConfig::default());
    }
}
