//! Backing stores: one Parquet file per ensemble.
//!
//! A backing store is the persisted table of one ensemble, written once and
//! then opened read-only by a provider. It lives at
//! `<storage directory>/<storage key>.parquet` and embeds the Arrow schema,
//! so vector metadata (field metadata) and the per-vector min/max index
//! (schema metadata) survive a write/reopen cycle.
//!
//! - [`write`]: validate per-realization input, build the store table and
//!   persist it atomically.
//! - [`read`]: open a store and read projected columns from it.

mod error;
pub mod read;
pub mod write;

use std::path::PathBuf;

use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use snafu::prelude::*;

pub use error::BackingStoreError;
pub(crate) use error::*;
pub use read::BackingStore;
pub use write::{
    RowOrder, build_store_table, build_store_table_from_ensemble_dataframe, write_store_table,
};

/// File extension of backing store files.
pub const STORE_FILE_EXTENSION: &str = "parquet";

/// Rows per Parquet row group.
const MAX_ROW_GROUP_SIZE: usize = 1024 * 1024;

/// Relative file name of the store for `key`.
///
/// The key must be a single, non-empty path component.
pub fn store_file_name(key: &str) -> Result<PathBuf, BackingStoreError> {
    ensure!(
        !key.is_empty() && key != "." && key != ".." && !key.contains(['/', '\\']),
        InvalidStorageKeySnafu { key }
    );
    Ok(PathBuf::from(format!("{key}.{STORE_FILE_EXTENSION}")))
}

/// Parquet writer settings used for every backing store.
pub fn writer_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_max_row_group_size(MAX_ROW_GROUP_SIZE)
        .build()
}
