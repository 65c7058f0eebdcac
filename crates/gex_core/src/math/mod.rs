//! Numerical building blocks for the Greeks Engine.
//!
//! - `distributions`: Standard normal density and cumulative distribution

pub mod distributions;

pub use distributions::{norm_cdf, norm_pdf};
