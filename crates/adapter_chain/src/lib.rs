//! # adapter_chain: Option Chain Snapshot Adapter
//!
//! Maps persisted CSV snapshots onto [`gex_core::chain::ChainSnapshot`] and
//! back, and locates snapshots in the on-disk capture tree.
//!
//! ## Persisted Layout
//!
//! One row per strike with `Strike`, `Spot`, `expiry`, `Call_OI`, `Put_OI`
//! and `call_*` / `put_*` columns for `iv`, `delta`, `gamma`, `vanna`,
//! `charm`, `ltp`, `close`, `vol` and `prev_oi`. Columns not listed are
//! ignored, so files that already carry derived exposure columns load
//! unchanged.
//!
//! ## Directory Layout
//!
//! ```text
//! <data_dir>/<INDEX>/<EXPIRY>/<stamp>.csv
//! ```
//!
//! Stamps sort lexically in capture order; expiries are ISO dates.

#![deny(missing_docs)]

pub mod directory;
pub mod error;
pub mod snapshot_csv;

pub use directory::SnapshotDirectory;
pub use error::LoadError;
pub use snapshot_csv::{
    read_snapshot, read_snapshot_from, write_exposure_csv, write_snapshot, write_snapshot_to,
};
