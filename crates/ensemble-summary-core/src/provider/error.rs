//! Error types and SNAFU context selectors for providers.
//!
//! Query-contract violations (empty vector list, resampling on a provider
//! that cannot resample, unknown vector names) get their own variants; store
//! and table failures are wrapped so the offending path or column stays in
//! the message.

use arrow::error::ArrowError;
use snafu::prelude::*;

use crate::common::frequency::Frequency;
use crate::store::BackingStoreError;
use crate::table::TableError;

/// Errors from provider construction and queries.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProviderError {
    /// A query asked for zero vectors.
    #[snafu(display("At least one vector name must be requested"))]
    EmptyVectorNames,

    /// A resampling frequency was requested from a provider that stores data
    /// on a fixed grid.
    #[snafu(display(
        "Resampling to {frequency} was requested, but this provider does not support resampling"
    ))]
    ResamplingNotSupported {
        /// The frequency that was requested.
        frequency: Frequency,
    },

    /// A requested vector does not exist in the backing store.
    #[snafu(display("Unknown vector {name}"))]
    UnknownVector {
        /// The requested vector name.
        name: String,
    },

    /// Building, opening or reading the backing store failed.
    #[snafu(display("Backing store error: {source}"))]
    Store {
        /// Underlying backing store error.
        #[snafu(source, backtrace)]
        source: BackingStoreError,
    },

    /// A table, resampling or sampling step failed.
    #[snafu(display("Table error: {source}"))]
    Table {
        /// Underlying table error.
        source: TableError,
    },

    /// An Arrow compute kernel failed.
    #[snafu(display("Arrow error: {source}"))]
    Arrow {
        /// Underlying Arrow error.
        source: ArrowError,
    },
}

impl From<BackingStoreError> for ProviderError {
    fn from(source: BackingStoreError) -> Self {
        ProviderError::Store { source }
    }
}
