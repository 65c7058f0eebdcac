//! Greeks Engine.
//!
//! Closed-form Black-Scholes delta, gamma and vanna for a single option,
//! used when vendor Greeks are missing and whenever a composite metric needs
//! internally consistent Greeks.
//!
//! Degenerate inputs (expired, zero or undefined volatility) produce
//! [`BsGreeks::ZERO`] rather than an error: option chains legitimately carry
//! such rows and they contribute no signal.

pub mod black_scholes;

pub use black_scholes::{bs_greeks, time_to_expiry, BlackScholes, BsGreeks, DAYS_PER_YEAR};
