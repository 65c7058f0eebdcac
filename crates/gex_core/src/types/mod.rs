//! Core option, time, and error types.
//!
//! This module provides:
//! - `side`: The `OptionSide` selector replacing `call_`/`put_` column prefixes
//! - `time`: ISO 8601 `Date` wrapper used for snapshot expiries
//! - `error`: Structured error types for snapshot construction and computations
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`OptionSide`] from `side`
//! - [`Date`] from `time`
//! - [`DateError`], [`SnapshotError`], [`ComputationError`], [`Component`] from `error`

pub mod error;
pub mod side;
pub mod time;

pub use error::{Component, ComputationError, DateError, SnapshotError};
pub use side::OptionSide;
pub use time::Date;
