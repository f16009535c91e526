//! Error type for building, writing and opening backing stores.

use arrow::{datatypes::DataType, error::ArrowError};
use parquet::errors::ParquetError;
use snafu::{Backtrace, prelude::*};

use crate::storage::StorageError;
use crate::table::TableError;

/// Errors raised by the backing store layer.
///
/// Validation variants name the offending realization (and, for date
/// ordering problems, the offending date pair) so callers can point users at
/// the broken input. All of them abort the write; nothing is published.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BackingStoreError {
    /// No realization tables were supplied.
    #[snafu(display("Cannot build a backing store from zero realization tables"))]
    EmptyInput,

    /// The storage key cannot be used as a file name.
    #[snafu(display("Invalid storage key {key:?}: must be a non-empty single path component"))]
    InvalidStorageKey {
        /// The rejected key.
        key: String,
    },

    /// A realization table has no `DATE` column.
    #[snafu(display("Realization {realization}: table has no DATE column"))]
    MissingDateColumn {
        /// Realization whose table is broken.
        realization: i64,
    },

    /// The `DATE` column is not a millisecond timestamp.
    #[snafu(display(
        "Realization {realization}: DATE column has type {datatype:?}, expected Timestamp(Millisecond, _)"
    ))]
    UnsupportedDateType {
        /// Realization whose table is broken.
        realization: i64,
        /// Type found in the input.
        datatype: DataType,
    },

    /// A per-realization table already carries a `REAL` column.
    #[snafu(display("Realization {realization}: input table must not contain a REAL column"))]
    RealColumnAlreadyPresent {
        /// Realization whose table is broken.
        realization: i64,
    },

    /// Dates of a realization do not strictly increase.
    #[snafu(display(
        "Realization {realization}: DATE column is not strictly increasing ({first} followed by {second})"
    ))]
    NonMonotonicDates {
        /// Realization whose table is broken.
        realization: i64,
        /// Earlier date of the first offending adjacent pair.
        first: String,
        /// Later date of the first offending adjacent pair.
        second: String,
    },

    /// A vector column is not a float column.
    #[snafu(display(
        "Realization {realization}: vector column {column} has type {datatype:?}, expected Float32 or Float64"
    ))]
    UnsupportedVectorType {
        /// Realization whose table is broken.
        realization: i64,
        /// Offending column.
        column: String,
        /// Type found in the input.
        datatype: DataType,
    },

    /// The same vector has different float types in different realizations.
    #[snafu(display(
        "Realization {realization}: vector column {column} has type {found:?}, previous realizations use {expected:?}"
    ))]
    InconsistentColumnType {
        /// Realization where the mismatch was detected.
        realization: i64,
        /// Offending column.
        column: String,
        /// Type established by earlier realizations.
        expected: DataType,
        /// Type found in this realization.
        found: DataType,
    },

    /// An ensemble dataframe lacks a required column.
    #[snafu(display("Ensemble dataframe has no {column} column"))]
    MissingEnsembleDataframeColumn {
        /// Name of the missing column.
        column: String,
    },

    /// A column of an ensemble dataframe has an unsupported type.
    #[snafu(display("Ensemble dataframe column {column} has unsupported type {datatype:?}"))]
    UnsupportedEnsembleDataframeColumnType {
        /// Offending column.
        column: String,
        /// Type found in the input.
        datatype: DataType,
    },

    /// An ensemble dataframe holds rows of more than one ensemble.
    #[snafu(display("Ensemble dataframe contains more than one ensemble: {ensembles:?}"))]
    MultipleEnsembles {
        /// Distinct ensemble names found.
        ensembles: Vec<String>,
    },

    /// The opened store has no vector columns.
    #[snafu(display("Backing store {path} contains no vectors"))]
    NoVectors {
        /// Store file path.
        path: String,
    },

    /// The opened store has no realizations.
    #[snafu(display("Backing store {path} contains no realizations"))]
    NoRealizations {
        /// Store file path.
        path: String,
    },

    /// Encoding or decoding the Parquet file failed.
    #[snafu(display("Parquet error for backing store {path}: {source}"))]
    Parquet {
        /// Store file path.
        path: String,
        /// Underlying Parquet error.
        source: ParquetError,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// Reading record batches from the store failed.
    #[snafu(display("Arrow error for backing store {path}: {source}"))]
    ReadBatch {
        /// Store file path.
        path: String,
        /// Underlying Arrow error.
        source: ArrowError,
    },

    /// Assembling the store table failed.
    #[snafu(display("Arrow error while building backing store table: {source}"))]
    Arrow {
        /// Underlying Arrow error.
        source: ArrowError,
    },

    /// The min/max index could not be encoded or decoded.
    #[snafu(display("Invalid per-vector min/max index: {source}"))]
    MinMaxIndex {
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Filesystem access failed.
    #[snafu(display("Storage error: {source}"))]
    Storage {
        /// Underlying storage error.
        source: StorageError,
    },

    /// A table utility or resampling step failed.
    #[snafu(display("Table error: {source}"))]
    Table {
        /// Underlying table error.
        source: TableError,
    },
}
