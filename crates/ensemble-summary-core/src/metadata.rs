//! Metadata carried alongside the stored table.
//!
//! Two kinds of metadata survive a write/reopen cycle inside the Parquet
//! file's embedded Arrow schema:
//!
//! - [`VectorMetadata`], one per vector column, stored as Arrow field
//!   metadata (see [`vector_metadata`]).
//! - The per-vector min/max index, stored as JSON under a reserved schema
//!   metadata key (see [`min_max`]).

pub mod min_max;
pub mod vector_metadata;

pub use min_max::{MinMax, PER_VECTOR_MIN_MAX_KEY, PerVectorMinMax};
pub use vector_metadata::VectorMetadata;
