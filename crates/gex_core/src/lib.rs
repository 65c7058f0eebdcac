//! # gex_core: Foundation for Dealer Positioning Analytics
//!
//! ## Foundation Layer Role
//!
//! gex_core is the bottom layer of the workspace, providing:
//! - Typed option chain snapshots validated once at construction (`chain`)
//! - The option side selector `OptionSide` and ISO `Date` (`types`)
//! - Error types: `SnapshotError`, `DateError`, `ComputationError` (`types::error`)
//! - Standard normal distribution functions (`math::distributions`)
//! - The closed-form Black-Scholes Greeks Engine (`greeks`)
//!
//! ## Purity
//!
//! Nothing in this crate performs I/O, logs, or holds global state. Every
//! function is a pure function of its arguments, so snapshots can be shared
//! across threads without coordination.
//!
//! ## Usage Examples
//!
//! ```rust
//! use gex_core::chain::{ChainSnapshot, SideQuote, StrikeRow};
//! use gex_core::greeks::bs_greeks;
//! use gex_core::types::{Date, OptionSide};
//!
//! let expiry = Date::from_ymd(2025, 1, 30).unwrap();
//! let rows = vec![
//!     StrikeRow::new(24000.0, SideQuote::new(1200), SideQuote::new(900)),
//!     StrikeRow::new(24050.0, SideQuote::new(800), SideQuote::new(1500)),
//! ];
//! let snapshot = ChainSnapshot::new(24060.0, expiry, rows).unwrap();
//! assert_eq!(snapshot.len(), 2);
//!
//! let g = bs_greeks(100.0, 100.0, 0.25, 0.05, 0.2, OptionSide::Call);
//! assert!(g.delta > 0.0 && g.delta < 1.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for snapshots, dates, and sides

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod chain;
pub mod greeks;
pub mod math;
pub mod types;
