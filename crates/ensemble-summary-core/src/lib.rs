//! Core engine for ensemble summary time series.
//!
//! An ensemble is a set of simulation realizations, each producing a table
//! of summary vectors over its own irregular report dates. This crate
//! persists one ensemble as a single Parquet backing store and answers
//! queries over it:
//!
//! - `table`: typed access to Arrow summary tables and date set algebra
//!   across realizations.
//! - `resampling`: calendar-aligned date grids plus backfill/linear
//!   interpolation, per realization or onto a shared grid, and point
//!   sampling at arbitrary dates.
//! - `store`: building, validating and atomically writing backing stores,
//!   and reopening them with projected reads.
//! - `provider`: the query surface, in a lazily-resampling and a
//!   presampled variant, both behind [`provider::EnsembleSummaryProvider`].
//! - `provider_set`: several named providers, one per ensemble.
//! - `discovery` / `ingest`: locating and loading per-realization input
//!   files.
//!
//! Vector metadata (unit, rate/total flags, keyword, ...) travels as Arrow
//! field metadata, see [`metadata::VectorMetadata`].
#![deny(missing_docs)]
pub mod common;
pub mod discovery;
pub mod ingest;
pub mod metadata;
pub mod provider;
pub mod provider_set;
pub mod resampling;
pub mod storage;
pub mod store;
pub mod table;

#[cfg(test)]
pub(crate) mod test_util;

pub use common::frequency::{DateSpan, Frequency};
pub use provider::{
    EnsembleSummaryProvider, LazyResamplingProvider, PresampledProvider, ProviderError,
    ResamplingOptions,
};
pub use provider_set::{EnsembleSummaryProviderSet, ProviderSetError};
pub use storage::StoreLocation;
