//! # gex_analytics: Dealer Positioning Analytics
//!
//! Pure functions that turn a validated [`ChainSnapshot`] into the
//! market-structure views used to reason about dealer hedging flows.
//!
//! This crate provides:
//! - Exposure Calculator: per-strike GEX/DEX/VEX/CEX (`exposure`)
//! - Key Level Detector: ATM, flip point, regime, gamma cage, power zones (`levels`)
//! - Quant Power Model: blended gamma/vanna mass and dealer-delta zero crossing (`quant_power`)
//! - Vol Surface Calculator: 25-delta risk reversal and 10-delta butterfly (`vol_surface`)
//! - Flow Classifier: two-snapshot order-flow labelling (`flow`)
//! - Strike window filter around ATM (`filter`)
//! - Combined market-structure report (`report`)
//!
//! ## Control Flow
//!
//! ```text
//! ChainSnapshot ──► compute_exposure ──┬──► detect_key_levels
//!       │                              └──► compute_quant_power
//!       ├──────────────────────────────────► compute_vol_surface
//!       └── (now, prev) ───────────────────► classify_flow
//! ```
//!
//! Every component is a pure function of its arguments: no I/O, no logging,
//! no shared state. Structural problems surface as [`ComputationError`]
//! naming the failing component; degenerate market data (thin chains,
//! missing Greeks, zero weights) produces documented fallback values.
//!
//! ## Usage Examples
//!
//! ```rust
//! use gex_analytics::exposure::{compute_exposure, ExposureKind};
//! use gex_analytics::levels::detect_key_levels;
//! use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
//! use gex_core::types::Date;
//!
//! let expiry = Date::from_ymd(2025, 1, 30).unwrap();
//! let rows = vec![
//!     StrikeRow::new(24000.0, SideQuote::new(500).with_gamma(0.0010), SideQuote::new(3000).with_gamma(0.0009)),
//!     StrikeRow::new(24050.0, SideQuote::new(1500).with_gamma(0.0012), SideQuote::new(1500).with_gamma(0.0012)),
//!     StrikeRow::new(24100.0, SideQuote::new(3000).with_gamma(0.0011), SideQuote::new(400).with_gamma(0.0008)),
//! ];
//! let snapshot = ChainSnapshot::new(24060.0, expiry, rows).unwrap();
//!
//! let gex = compute_exposure(&snapshot, 75, ExposureKind::Gamma).unwrap();
//! let levels = detect_key_levels(&gex, 4, 2).unwrap();
//! assert_eq!(levels.atm_strike, 24050.0);
//! assert_eq!(levels.power_zones.len(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for all result types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod exposure;
pub mod filter;
pub mod flow;
pub mod levels;
pub mod quant_power;
pub mod report;
pub mod vol_surface;

pub use gex_core::chain::ChainSnapshot;
pub use gex_core::types::{Component, ComputationError};

pub use exposure::{compute_all_exposures, compute_exposure, ExposureKind, ExposureTable};
pub use filter::filter_near_strikes;
pub use flow::{classify_flow, FlowResult};
pub use levels::{detect_key_levels, detect_key_levels_with, KeyLevelConfig, KeyLevels};
pub use quant_power::{compute_quant_power, QuantPowerParams, QuantPowerResult};
pub use report::{market_structure, AnalyticsParams, MarketStructure};
pub use vol_surface::{compute_vol_surface, VolSurfaceResult};
