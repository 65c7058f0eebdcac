//! Error types for structured error handling.
//!
//! This module provides:
//! - `DateError`: Errors from date construction and parsing
//! - `SnapshotError`: Structural violations found while building a chain snapshot
//! - `ComputationError`: Failures of an analytics component, tagged with the component
//!
//! Degenerate market states (expired rows, zero IV, thin chains) are not
//! errors; components return their documented fallback values instead.

use std::fmt;
use thiserror::Error;

use super::OptionSide;

/// Date-related errors.
///
/// # Examples
/// ```
/// use gex_core::types::DateError;
///
/// let err = DateError::InvalidDate { year: 2024, month: 2, day: 30 };
/// assert_eq!(format!("{}", err), "Invalid date: 2024-2-30");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// Invalid date components (e.g., February 30th).
    #[error("Invalid date: {year}-{month}-{day}")]
    InvalidDate {
        /// Year component
        year: i32,
        /// Month component (1-12)
        month: u32,
        /// Day component (1-31)
        day: u32,
    },

    /// Failed to parse date string.
    #[error("Date parse error: {0}")]
    ParseError(String),
}

/// Structural errors raised while constructing a chain snapshot.
///
/// A snapshot that fails these checks is never handed to an analytics
/// component, so spot/expiry constancy and strike uniqueness are asserted
/// exactly once.
///
/// # Examples
/// ```
/// use gex_core::types::SnapshotError;
///
/// let err = SnapshotError::DuplicateStrike { strike: 24000.0 };
/// assert_eq!(format!("{}", err), "Duplicate strike in snapshot: 24000");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    /// The snapshot has no rows.
    #[error("Snapshot has no strikes")]
    EmptySnapshot,

    /// Spot price is non-positive or not finite.
    #[error("Invalid spot price: S = {spot}")]
    InvalidSpot {
        /// The invalid spot value
        spot: f64,
    },

    /// Strike is non-positive or not finite.
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// The invalid strike value
        strike: f64,
    },

    /// The same strike appears twice.
    #[error("Duplicate strike in snapshot: {strike}")]
    DuplicateStrike {
        /// The repeated strike
        strike: f64,
    },

    /// A row carries a different spot than the first row.
    #[error("Inconsistent spot at strike {strike}: expected {expected}, found {found}")]
    InconsistentSpot {
        /// Strike of the offending row
        strike: f64,
        /// Spot of the first row
        expected: f64,
        /// Spot of the offending row
        found: f64,
    },

    /// A row carries a different expiry than the first row.
    #[error("Inconsistent expiry at strike {strike}: expected {expected}, found {found}")]
    InconsistentExpiry {
        /// Strike of the offending row
        strike: f64,
        /// Expiry of the first row
        expected: String,
        /// Expiry of the offending row
        found: String,
    },

    /// Negative open interest or volume on one side of a strike.
    #[error("Invalid {field} for {side} at strike {strike}: {value}")]
    InvalidCount {
        /// Strike of the offending row
        strike: f64,
        /// Side of the offending quote
        side: OptionSide,
        /// Column name
        field: &'static str,
        /// Offending value
        value: f64,
    },

    /// Expiry could not be parsed.
    #[error(transparent)]
    Date(#[from] DateError),
}

/// Analytics component that raised a [`ComputationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Component {
    /// Black-Scholes Greeks Engine
    GreeksEngine,
    /// Exposure Calculator
    Exposure,
    /// Key Level Detector
    KeyLevels,
    /// Quant Power Model
    QuantPower,
    /// Vol Surface Calculator
    VolSurface,
    /// Flow Classifier
    Flow,
    /// Strike window filter
    StrikeFilter,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::GreeksEngine => "greeks engine",
            Component::Exposure => "exposure calculator",
            Component::KeyLevels => "key level detector",
            Component::QuantPower => "quant power model",
            Component::VolSurface => "vol surface calculator",
            Component::Flow => "flow classifier",
            Component::StrikeFilter => "strike filter",
        };
        f.write_str(name)
    }
}

/// Typed computation failure.
///
/// Raised on malformed structural input. Every variant names the component
/// that failed so the caller can report which metric is unavailable.
///
/// # Examples
/// ```
/// use gex_core::types::{Component, ComputationError};
///
/// let err = ComputationError::InvalidParameter {
///     component: Component::QuantPower,
///     name: "vanna_weight",
///     value: 1.5,
/// };
/// assert_eq!(
///     format!("{}", err),
///     "quant power model: invalid parameter vanna_weight = 1.5"
/// );
/// assert_eq!(err.component(), Component::QuantPower);
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    /// A numeric parameter is outside its valid domain.
    #[error("{component}: invalid parameter {name} = {value}")]
    InvalidParameter {
        /// Failing component
        component: Component,
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// Required market data is absent from the snapshot.
    #[error("{component}: missing data: {what}")]
    MissingData {
        /// Failing component
        component: Component,
        /// Description of the missing data
        what: String,
    },

    /// An intermediate quantity became NaN or infinite.
    #[error("{component}: non-finite {quantity} at strike {strike}")]
    NonFinite {
        /// Failing component
        component: Component,
        /// Name of the quantity
        quantity: &'static str,
        /// Strike at which it occurred
        strike: f64,
    },

    /// An exposure table of the wrong kind was supplied.
    #[error("{component}: expected {expected} exposure, found {found}")]
    WrongExposureKind {
        /// Failing component
        component: Component,
        /// Expected exposure code
        expected: &'static str,
        /// Supplied exposure code
        found: &'static str,
    },

    /// The snapshot derived by the component was structurally invalid.
    #[error("{component}: {source}")]
    Snapshot {
        /// Failing component
        component: Component,
        /// Underlying snapshot error
        #[source]
        source: SnapshotError,
    },
}

impl ComputationError {
    /// Component that raised the error.
    pub fn component(&self) -> Component {
        match self {
            ComputationError::InvalidParameter { component, .. }
            | ComputationError::MissingData { component, .. }
            | ComputationError::NonFinite { component, .. }
            | ComputationError::WrongExposureKind { component, .. }
            | ComputationError::Snapshot { component, .. } => *component,
        }
    }
}
