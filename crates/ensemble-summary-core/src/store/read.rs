//! Opening backing stores and reading projected columns.
//!
//! Opening a store parses only the Parquet footer and the embedded Arrow
//! schema. The file handle and parsed metadata are kept for the lifetime of
//! the [`BackingStore`], and every read decodes only the requested columns.
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use log::info;
use parquet::arrow::{
    ProjectionMask,
    arrow_reader::{ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder},
};
use snafu::prelude::*;

use crate::storage::{self, OtherIoSnafu, StoreLocation};
use crate::store::{
    BackingStoreError, ParquetSnafu, ReadBatchSnafu, StorageSnafu, TableSnafu, store_file_name,
};
use crate::table::{
    access::select_columns,
    error::{MissingColumnSnafu, TableError},
};

/// An opened, read-only backing store.
#[derive(Debug)]
pub struct BackingStore {
    path: PathBuf,
    file: File,
    metadata: ArrowReaderMetadata,
}

impl BackingStore {
    /// Open the store for `key` under `location`.
    ///
    /// Returns `Ok(None)` if no store has been written for the key.
    pub fn open(location: &StoreLocation, key: &str) -> Result<Option<Self>, BackingStoreError> {
        let started = Instant::now();
        let rel_path = store_file_name(key)?;
        let path = location.resolve(&rel_path);

        if !storage::exists(location, &rel_path) {
            return Ok(None);
        }
        // The file may be removed before it is opened.
        let file = match storage::open_read(location, &rel_path) {
            Ok(file) => file,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e).context(StorageSnafu),
        };

        let metadata = ArrowReaderMetadata::load(&file, ArrowReaderOptions::default()).context(
            ParquetSnafu {
                path: path.display().to_string(),
            },
        )?;

        info!(
            "opened backing store {}: {} row(s), {} column(s) in {:?}",
            path.display(),
            metadata.metadata().file_metadata().num_rows(),
            metadata.schema().fields().len(),
            started.elapsed()
        );
        Ok(Some(Self {
            path,
            file,
            metadata,
        }))
    }

    /// Absolute path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Arrow schema of the stored table, including field and schema metadata.
    pub fn schema(&self) -> &SchemaRef {
        self.metadata.schema()
    }

    /// Number of stored rows.
    pub fn num_rows(&self) -> usize {
        usize::try_from(self.metadata.metadata().file_metadata().num_rows()).unwrap_or(0)
    }

    /// Read `columns`, in the given order, for every stored row.
    ///
    /// Unknown column names are reported as
    /// [`TableError::MissingColumn`](crate::table::TableError::MissingColumn).
    pub fn read_columns(&self, columns: &[&str]) -> Result<RecordBatch, BackingStoreError> {
        let display_path = self.path.display().to_string();
        let roots = columns
            .iter()
            .map(|name| {
                self.column_index(name)
                    .context(MissingColumnSnafu { column: *name })
            })
            .collect::<Result<Vec<_>, TableError>>()
            .context(TableSnafu)?;

        let file = self
            .file
            .try_clone()
            .context(OtherIoSnafu {
                path: display_path.as_str(),
            })
            .context(StorageSnafu)?;

        let mask = ProjectionMask::roots(self.metadata.parquet_schema(), roots);
        let reader = ParquetRecordBatchReaderBuilder::new_with_metadata(file, self.metadata.clone())
            .with_projection(mask)
            .build()
            .context(ParquetSnafu {
                path: display_path.as_str(),
            })?;

        let projected = reader.schema();
        let batches = reader
            .collect::<Result<Vec<_>, _>>()
            .context(ReadBatchSnafu {
                path: display_path.as_str(),
            })?;
        let table = concat_batches(&projected, &batches).context(ReadBatchSnafu {
            path: display_path.as_str(),
        })?;

        select_columns(&table, columns).context(TableSnafu)
    }

    /// Index of `column` in the stored schema.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.schema().index_of(column).ok()
    }
}
