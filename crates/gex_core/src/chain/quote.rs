//! One side (call or put) of one strike.

use std::fmt;

/// Vendor-supplied Greek selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Greek {
    /// ∂V/∂S
    Delta,
    /// ∂²V/∂S²
    Gamma,
    /// ∂²V/∂S∂σ
    Vanna,
    /// ∂²V/∂S∂t
    Charm,
}

impl fmt::Display for Greek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Greek::Delta => "delta",
            Greek::Gamma => "gamma",
            Greek::Vanna => "vanna",
            Greek::Charm => "charm",
        })
    }
}

/// Zero-fill a nullable market value at an aggregation boundary.
///
/// # Examples
/// ```
/// use gex_core::chain::or_zero;
///
/// assert_eq!(or_zero(Some(0.5)), 0.5);
/// assert_eq!(or_zero(None), 0.0);
/// ```
#[inline]
pub fn or_zero(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

#[inline]
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Market data and vendor Greeks for one side of one strike.
///
/// IV is in percentage units (14.2 means 14.2%). Open interest and volume
/// are contract counts; volume is the cumulative session counter.
///
/// # Examples
/// ```
/// use gex_core::chain::{Greek, SideQuote};
///
/// let quote = SideQuote::new(1_500)
///     .with_iv(14.2)
///     .with_gamma(0.0011)
///     .with_delta(f64::NAN);
///
/// assert_eq!(quote.oi(), 1_500);
/// assert_eq!(quote.greek(Greek::Gamma), Some(0.0011));
/// // Non-finite vendor values are treated as missing
/// assert_eq!(quote.greek(Greek::Delta), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SideQuote {
    oi: u64,
    prev_oi: Option<u64>,
    volume: Option<u64>,
    iv: Option<f64>,
    delta: Option<f64>,
    gamma: Option<f64>,
    vanna: Option<f64>,
    charm: Option<f64>,
    ltp: Option<f64>,
    close: Option<f64>,
}

impl SideQuote {
    /// Creates a quote with the given open interest and no other data.
    pub fn new(oi: u64) -> Self {
        Self {
            oi,
            ..Self::default()
        }
    }

    /// Sets the previous-session open interest.
    pub fn with_prev_oi(mut self, prev_oi: Option<u64>) -> Self {
        self.prev_oi = prev_oi;
        self
    }

    /// Sets the cumulative traded volume.
    pub fn with_volume(mut self, volume: Option<u64>) -> Self {
        self.volume = volume;
        self
    }

    /// Sets implied volatility (percentage units).
    pub fn with_iv(mut self, iv: impl Into<Option<f64>>) -> Self {
        self.iv = finite(iv.into());
        self
    }

    /// Sets the vendor delta.
    pub fn with_delta(mut self, delta: impl Into<Option<f64>>) -> Self {
        self.delta = finite(delta.into());
        self
    }

    /// Sets the vendor gamma.
    pub fn with_gamma(mut self, gamma: impl Into<Option<f64>>) -> Self {
        self.gamma = finite(gamma.into());
        self
    }

    /// Sets the vendor vanna.
    pub fn with_vanna(mut self, vanna: impl Into<Option<f64>>) -> Self {
        self.vanna = finite(vanna.into());
        self
    }

    /// Sets the vendor charm.
    pub fn with_charm(mut self, charm: impl Into<Option<f64>>) -> Self {
        self.charm = finite(charm.into());
        self
    }

    /// Sets the last traded price.
    pub fn with_ltp(mut self, ltp: impl Into<Option<f64>>) -> Self {
        self.ltp = finite(ltp.into());
        self
    }

    /// Sets the previous close.
    pub fn with_close(mut self, close: impl Into<Option<f64>>) -> Self {
        self.close = finite(close.into());
        self
    }

    /// Open interest.
    #[inline]
    pub fn oi(&self) -> u64 {
        self.oi
    }

    /// Previous-session open interest.
    #[inline]
    pub fn prev_oi(&self) -> Option<u64> {
        self.prev_oi
    }

    /// Cumulative traded volume.
    #[inline]
    pub fn volume(&self) -> Option<u64> {
        self.volume
    }

    /// Implied volatility in percentage units.
    #[inline]
    pub fn iv(&self) -> Option<f64> {
        self.iv
    }

    /// Implied volatility as a decimal (14.2 → 0.142).
    #[inline]
    pub fn iv_decimal(&self) -> Option<f64> {
        self.iv.map(|v| v / 100.0)
    }

    /// Last traded price.
    #[inline]
    pub fn ltp(&self) -> Option<f64> {
        self.ltp
    }

    /// Previous close.
    #[inline]
    pub fn close(&self) -> Option<f64> {
        self.close
    }

    /// Vendor Greek, if supplied.
    #[inline]
    pub fn greek(&self, greek: Greek) -> Option<f64> {
        match greek {
            Greek::Delta => self.delta,
            Greek::Gamma => self.gamma,
            Greek::Vanna => self.vanna,
            Greek::Charm => self.charm,
        }
    }

    /// Open interest change versus the previous session, when known.
    pub fn oi_change(&self) -> Option<i64> {
        self.prev_oi.map(|prev| self.oi as i64 - prev as i64)
    }
}
