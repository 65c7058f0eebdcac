//! Option chain snapshots.
//!
//! A [`ChainSnapshot`] is one capture of an expiry's strike ladder: a single
//! spot, a single expiry, and one [`StrikeRow`] per unique strike holding the
//! call and put [`SideQuote`]s. All structural preconditions are checked in
//! [`ChainSnapshot::new`] / [`ChainSnapshot::from_records`]; downstream
//! components never re-read spot or expiry from individual rows.
//!
//! Vendor fields that may be absent are `Option<f64>`. Non-finite values are
//! stored as `None`, and zero-filling happens only at aggregation time via
//! [`or_zero`].

mod quote;
mod snapshot;

pub use quote::{or_zero, Greek, SideQuote};
pub use snapshot::{ChainRecord, ChainSnapshot, OptionLeg, StrikeRow};
