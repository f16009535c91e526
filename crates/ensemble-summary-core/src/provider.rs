//! Providers: the query surface over one ensemble's backing store.
//!
//! Two variants implement [`EnsembleSummaryProvider`]:
//!
//! - [`LazyResamplingProvider`] stores each realization's raw dates and
//!   resamples on demand, at whatever frequency a query asks for.
//! - [`PresampledProvider`] stores data already gridded at one frequency and
//!   rejects query-time resampling.
//!
//! Both open their store once, cache the vector/realization sets, vector
//! metadata and the min/max index, and keep the file handle until dropped.

mod error;
mod lazy;
mod presampled;
mod state;

use std::fmt;

use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::common::frequency::{DateSpan, Frequency};
use crate::metadata::VectorMetadata;
use crate::resampling::grid::{
    find_intersection_of_normalized_dates, find_union_of_normalized_dates,
};
use crate::table::{
    access::datetime_from_millis,
    dates::{find_intersection_of_realization_dates, find_union_of_realization_dates},
};

pub use error::ProviderError;
pub use lazy::LazyResamplingProvider;
pub use presampled::PresampledProvider;

/// How `get_vectors_df` should resample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResamplingOptions {
    /// Target grid cadence.
    pub frequency: Frequency,
    /// Put every realization on one shared grid built from the union or
    /// intersection of their normalized date ranges. `None` gives each
    /// realization its own grid.
    pub common_date_span: Option<DateSpan>,
}

impl ResamplingOptions {
    /// Resample at `frequency`, one grid per realization.
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            common_date_span: None,
        }
    }

    /// Share one grid across realizations.
    pub fn with_common_date_span(mut self, span: DateSpan) -> Self {
        self.common_date_span = Some(span);
        self
    }
}

/// Query interface of an ensemble summary provider.
///
/// Implementations are immutable after construction; repeated calls with the
/// same arguments return the same results.
pub trait EnsembleSummaryProvider: Send + Sync + fmt::Debug {
    /// All vector names, in storage column order.
    fn vector_names(&self) -> Vec<String>;

    /// Vector names, optionally dropping vectors whose values are all zero
    /// and/or constant according to the min/max index.
    fn vector_names_filtered_by_value(
        &self,
        exclude_all_values_zero: bool,
        exclude_constant_values: bool,
    ) -> Vec<String>;

    /// Realization ids present in the store, ascending.
    fn realizations(&self) -> Vec<i64>;

    /// Metadata of `vector_name`, if the store has any for it.
    fn vector_metadata(&self, vector_name: &str) -> Option<VectorMetadata>;

    /// Whether `dates` and `get_vectors_df` accept a resampling frequency.
    fn supports_resampling(&self) -> bool;

    /// Sorted dates available for `realizations` (all when `None`).
    ///
    /// Without a frequency the raw per-realization dates are combined by
    /// `date_span`. With one, the normalized per-realization ranges are
    /// combined and gridded.
    fn dates(
        &self,
        resampling_frequency: Option<Frequency>,
        realizations: Option<&[i64]>,
        date_span: DateSpan,
    ) -> Result<Vec<DateTime<Utc>>, ProviderError>;

    /// Rows of `DATE`, `REAL` and the requested vectors, in request order.
    fn get_vectors_df(
        &self,
        vector_names: &[&str],
        resampling: Option<ResamplingOptions>,
        realizations: Option<&[i64]>,
    ) -> Result<RecordBatch, ProviderError>;

    /// One row per realization with `REAL` and the requested vectors at `date`.
    fn get_vectors_for_date_df(
        &self,
        date: DateTime<Utc>,
        vector_names: &[&str],
        realizations: Option<&[i64]>,
    ) -> Result<RecordBatch, ProviderError>;
}

/// Combine the dates of a `DATE`/`REAL` table as [`EnsembleSummaryProvider::dates`] describes.
pub(crate) fn combine_dates(
    table: &RecordBatch,
    frequency: Option<Frequency>,
    date_span: DateSpan,
) -> Result<Vec<DateTime<Utc>>, ProviderError> {
    let millis = match (frequency, date_span) {
        (None, DateSpan::Intersection) => find_intersection_of_realization_dates(table),
        (None, DateSpan::Union) => find_union_of_realization_dates(table),
        (Some(f), DateSpan::Intersection) => find_intersection_of_normalized_dates(table, f),
        (Some(f), DateSpan::Union) => find_union_of_normalized_dates(table, f),
    }
    .context(error::TableSnafu)?;

    millis
        .into_iter()
        .map(datetime_from_millis)
        .collect::<Result<_, _>>()
        .context(error::TableSnafu)
}

/// Drop the leading `DATE` column of a point-sample result.
pub(crate) fn drop_date_column(table: &RecordBatch) -> Result<RecordBatch, ProviderError> {
    let keep: Vec<usize> = (1..table.num_columns()).collect();
    table.project(&keep).context(error::ArrowSnafu)
}
