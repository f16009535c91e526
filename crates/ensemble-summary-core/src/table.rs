//! Table layer: typed access to summary tables held as Arrow record batches.
//!
//! A summary table is a [`arrow::record_batch::RecordBatch`] with a `DATE`
//! column (`Timestamp(Millisecond, _)`), usually a `REAL` column (`Int64`)
//! and one float column per summary vector. The helpers in this module are
//! pure functions over such batches:
//!
//! - [`access`]: column lookup, typed views and table assembly.
//! - [`segments`]: contiguous per-realization row ranges.
//! - [`dates`]: date set algebra across realizations.
//! - [`error`]: the [`TableError`] shared by this layer and resampling.

pub mod access;
pub mod dates;
pub mod error;
pub mod segments;

pub use error::TableError;
