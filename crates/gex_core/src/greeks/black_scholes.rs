//! Black-Scholes Greeks for European options.
//!
//! ## Formulas
//!
//! - d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
//! - d₂ = d₁ − σ√T
//! - Delta = Φ(d₁) for calls, Φ(d₁) − 1 for puts
//! - Gamma = φ(d₁) / (S·σ·√T)
//! - Vanna = −φ(d₁)·d₂ / σ

use num_traits::Float;

use crate::math::{norm_cdf, norm_pdf};
use crate::types::{Date, OptionSide};

/// Calendar days per year used for time-to-expiry.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Delta, gamma and vanna of a single option.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BsGreeks<T = f64> {
    /// ∂V/∂S
    pub delta: T,
    /// ∂²V/∂S²
    pub gamma: T,
    /// ∂²V/∂S∂σ
    pub vanna: T,
}

impl BsGreeks<f64> {
    /// The "no signal" result returned for degenerate inputs.
    pub const ZERO: BsGreeks<f64> = BsGreeks {
        delta: 0.0,
        gamma: 0.0,
        vanna: 0.0,
    };
}

/// Black-Scholes model state for one underlying.
///
/// Holds spot, rate and volatility; strike, expiry and side are supplied per
/// call so one model can be evaluated across a whole strike ladder.
///
/// # Examples
/// ```
/// use gex_core::greeks::BlackScholes;
/// use gex_core::types::OptionSide;
///
/// let bs = BlackScholes::new(100.0_f64, 0.05, 0.2).unwrap();
/// let call = bs.greeks(100.0, 0.5, OptionSide::Call).unwrap();
/// let put = bs.greeks(100.0, 0.5, OptionSide::Put).unwrap();
///
/// // Put-call delta parity
/// assert!((call.delta - put.delta - 1.0).abs() < 1e-12);
/// assert_eq!(call.gamma, put.gamma);
/// ```
#[derive(Debug, Clone)]
pub struct BlackScholes<T: Float> {
    spot: T,
    rate: T,
    volatility: T,
}

impl<T: Float> BlackScholes<T> {
    /// Creates a model, or `None` when spot or volatility is degenerate.
    ///
    /// Degenerate means non-positive or NaN; callers map `None` to
    /// [`BsGreeks::ZERO`].
    pub fn new(spot: T, rate: T, volatility: T) -> Option<Self> {
        let zero = T::zero();
        // NaN fails both comparisons
        if !(spot > zero) || !spot.is_finite() || !(volatility > zero) || !volatility.is_finite()
        {
            return None;
        }
        if !rate.is_finite() {
            return None;
        }
        Some(Self {
            spot,
            rate,
            volatility,
        })
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> T {
        self.spot
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> T {
        self.volatility
    }

    /// d₁ and d₂ for a strike and year fraction; `None` if `strike` or
    /// `expiry` is degenerate.
    #[inline]
    pub fn d1_d2(&self, strike: T, expiry: T) -> Option<(T, T)> {
        let zero = T::zero();
        if !(strike > zero) || !strike.is_finite() || !(expiry > zero) || !expiry.is_finite() {
            return None;
        }
        let half = T::from(0.5)?;
        let vol_sqrt_t = self.volatility * expiry.sqrt();
        let d1 = ((self.spot / strike).ln()
            + (self.rate + half * self.volatility * self.volatility) * expiry)
            / vol_sqrt_t;
        Some((d1, d1 - vol_sqrt_t))
    }

    /// Delta, gamma and vanna for one option; `None` on degenerate strike/expiry.
    pub fn greeks(&self, strike: T, expiry: T, side: OptionSide) -> Option<BsGreeks<T>> {
        let (d1, d2) = self.d1_d2(strike, expiry)?;
        let pdf_d1 = norm_pdf(d1);
        let cdf_d1 = norm_cdf(d1);

        let delta = match side {
            OptionSide::Call => cdf_d1,
            OptionSide::Put => cdf_d1 - T::one(),
        };
        let gamma = pdf_d1 / (self.spot * self.volatility * expiry.sqrt());
        let vanna = -pdf_d1 * d2 / self.volatility;

        Some(BsGreeks {
            delta,
            gamma,
            vanna,
        })
    }
}

/// Black-Scholes `(delta, gamma, vanna)` with the zero fallback.
///
/// # Arguments
/// * `spot` - Underlying price S
/// * `strike` - Strike K
/// * `expiry` - Time to expiry in years T
/// * `rate` - Risk-free rate r
/// * `volatility` - Implied volatility σ as a decimal (0.2, not 20)
/// * `side` - Call or put
///
/// # Examples
/// ```
/// use gex_core::greeks::{bs_greeks, BsGreeks};
/// use gex_core::types::OptionSide;
///
/// // Expired option: no signal
/// assert_eq!(bs_greeks(100.0, 100.0, 0.0, 0.05, 0.2, OptionSide::Call), BsGreeks::ZERO);
///
/// let put = bs_greeks(100.0, 100.0, 0.25, 0.05, 0.2, OptionSide::Put);
/// assert!(put.delta < 0.0 && put.delta > -1.0);
/// assert!(put.gamma > 0.0);
/// ```
pub fn bs_greeks(
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    volatility: f64,
    side: OptionSide,
) -> BsGreeks {
    BlackScholes::new(spot, rate, volatility)
        .and_then(|model| model.greeks(strike, expiry, side))
        .unwrap_or(BsGreeks::ZERO)
}

/// Year fraction from `valuation` to `expiry`.
///
/// Calendar days, clipped to a minimum of one day, divided by 365. An
/// expiry on or before the valuation date therefore still prices with one
/// day remaining.
///
/// # Examples
/// ```
/// use gex_core::greeks::time_to_expiry;
/// use gex_core::types::Date;
///
/// let today = Date::from_ymd(2025, 1, 23).unwrap();
/// let expiry = Date::from_ymd(2025, 1, 30).unwrap();
/// assert!((time_to_expiry(expiry, today) - 7.0 / 365.0).abs() < 1e-15);
/// assert!((time_to_expiry(today, expiry) - 1.0 / 365.0).abs() < 1e-15);
/// ```
pub fn time_to_expiry(expiry: Date, valuation: Date) -> f64 {
    valuation.days_until(expiry).max(1) as f64 / DAYS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_expiry_is_no_signal() {
        let g = bs_greeks(100.0, 100.0, 0.0, 0.05, 0.2, OptionSide::Call);
        assert_eq!(g, BsGreeks::ZERO);
    }

    #[test]
    fn test_degenerate_volatility_is_no_signal() {
        for vol in [0.0, -0.1, f64::NAN] {
            for side in OptionSide::ALL {
                assert_eq!(bs_greeks(100.0, 95.0, 0.5, 0.05, vol, side), BsGreeks::ZERO);
            }
        }
    }

    #[test]
    fn test_negative_expiry_is_no_signal() {
        assert_eq!(
            bs_greeks(100.0, 100.0, -0.1, 0.05, 0.2, OptionSide::Put),
            BsGreeks::ZERO
        );
    }

    #[test]
    fn test_atm_bounds() {
        let call = bs_greeks(100.0, 100.0, 0.5, 0.05, 0.2, OptionSide::Call);
        let put = bs_greeks(100.0, 100.0, 0.5, 0.05, 0.2, OptionSide::Put);

        assert!(call.gamma > 0.0);
        assert!(call.delta > 0.0 && call.delta < 1.0);
        assert!(put.delta > -1.0 && put.delta < 0.0);
        assert_relative_eq!(call.gamma, put.gamma, epsilon = 1e-15);
        assert_relative_eq!(call.vanna, put.vanna, epsilon = 1e-15);
    }

    #[test]
    fn test_reference_values() {
        // S=100, K=100, T=1, r=5%, σ=20%: d1 = 0.35, d2 = 0.15
        let g = bs_greeks(100.0, 100.0, 1.0, 0.05, 0.2, OptionSide::Call);
        let pdf = norm_pdf(0.35_f64);

        assert_relative_eq!(g.delta, 0.636_830_651_175_619, epsilon = 1e-6);
        assert_relative_eq!(g.gamma, pdf / (100.0 * 0.2), epsilon = 1e-12);
        assert_relative_eq!(g.vanna, -pdf * 0.15 / 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_vanna_sign_flips_around_forward() {
        // vanna < 0 where d2 > 0 (low strikes), > 0 where d2 < 0
        let low_k = bs_greeks(100.0, 80.0, 0.25, 0.0, 0.2, OptionSide::Call);
        let high_k = bs_greeks(100.0, 120.0, 0.25, 0.0, 0.2, OptionSide::Call);
        assert!(low_k.vanna < 0.0);
        assert!(high_k.vanna > 0.0);
    }

    #[test]
    fn test_model_rejects_degenerate_spot() {
        assert!(BlackScholes::new(0.0_f64, 0.05, 0.2).is_none());
        assert!(BlackScholes::new(f64::NAN, 0.05, 0.2).is_none());
        assert!(BlackScholes::new(100.0_f64, 0.05, 0.2).is_some());
    }

    #[test]
    fn test_time_to_expiry_clips_to_one_day() {
        let valuation = Date::from_ymd(2025, 2, 10).unwrap();
        let expired = Date::from_ymd(2025, 2, 4).unwrap();
        assert_relative_eq!(time_to_expiry(expired, valuation), 1.0 / DAYS_PER_YEAR);
        assert_relative_eq!(time_to_expiry(valuation, valuation), 1.0 / DAYS_PER_YEAR);
    }

    #[test]
    fn test_f32_model() {
        let bs = BlackScholes::new(100.0_f32, 0.05, 0.2).unwrap();
        let g = bs.greeks(100.0, 1.0, OptionSide::Call).unwrap();
        assert!((g.delta - 0.6368).abs() < 1e-3);
    }
}
