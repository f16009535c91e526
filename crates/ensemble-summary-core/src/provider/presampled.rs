//! Provider over data resampled once, at write time.
use std::collections::BTreeMap;
use std::path::PathBuf;

use arrow::array::BooleanArray;
use arrow::compute::filter_record_batch;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use snafu::prelude::*;

use crate::common::frequency::{DateSpan, Frequency};
use crate::metadata::VectorMetadata;
use crate::provider::error::{ArrowSnafu, ProviderError, ResamplingNotSupportedSnafu, TableSnafu};
use crate::provider::state::StoreState;
use crate::provider::{EnsembleSummaryProvider, ResamplingOptions, combine_dates, drop_date_column};
use crate::storage::StoreLocation;
use crate::store::{
    BackingStoreError, RowOrder, build_store_table, build_store_table_from_ensemble_dataframe,
    write_store_table,
};
use crate::table::access::date_values;

/// Provider over a store already gridded at a fixed frequency.
///
/// Rows are stored ordered by date, then realization. Query-time
/// resampling is rejected with [`ProviderError::ResamplingNotSupported`].
#[derive(Debug)]
pub struct PresampledProvider {
    state: StoreState,
}

impl PresampledProvider {
    /// Build and persist the backing store for `key` from per-realization
    /// tables of `DATE` plus vector columns.
    ///
    /// With `frequency` set each realization is resampled before storing;
    /// otherwise the input dates are stored as given.
    pub fn write_backing_store_from_per_realization_tables(
        location: &StoreLocation,
        key: &str,
        per_realization: &BTreeMap<i64, RecordBatch>,
        frequency: Option<Frequency>,
    ) -> Result<PathBuf, BackingStoreError> {
        let table = build_store_table(per_realization, RowOrder::DateThenRealization, frequency)?;
        write_store_table(location, key, &table)
    }

    /// Build and persist the backing store for `key` from one combined table
    /// with `DATE`, `REAL`, `ENSEMBLE` and vector columns.
    ///
    /// The table must hold a single ensemble; `ENSEMBLE` is not stored.
    pub fn write_backing_store_from_ensemble_dataframe(
        location: &StoreLocation,
        key: &str,
        ensemble_df: &RecordBatch,
    ) -> Result<PathBuf, BackingStoreError> {
        let table =
            build_store_table_from_ensemble_dataframe(ensemble_df, RowOrder::DateThenRealization)?;
        write_store_table(location, key, &table)
    }

    /// Open the provider for `key`, or `Ok(None)` if no store exists yet.
    pub fn from_backing_store(
        location: &StoreLocation,
        key: &str,
    ) -> Result<Option<Self>, ProviderError> {
        Ok(StoreState::open(location, key)?.map(|state| Self { state }))
    }
}

fn reject_resampling(frequency: Option<Frequency>) -> Result<(), ProviderError> {
    match frequency {
        Some(frequency) => ResamplingNotSupportedSnafu { frequency }.fail(),
        None => Ok(()),
    }
}

impl EnsembleSummaryProvider for PresampledProvider {
    fn vector_names(&self) -> Vec<String> {
        self.state.vector_names().to_vec()
    }

    fn vector_names_filtered_by_value(
        &self,
        exclude_all_values_zero: bool,
        exclude_constant_values: bool,
    ) -> Vec<String> {
        self.state
            .vector_names_filtered_by_value(exclude_all_values_zero, exclude_constant_values)
    }

    fn realizations(&self) -> Vec<i64> {
        self.state.realizations().to_vec()
    }

    fn vector_metadata(&self, vector_name: &str) -> Option<VectorMetadata> {
        self.state.vector_metadata(vector_name)
    }

    fn supports_resampling(&self) -> bool {
        false
    }

    fn dates(
        &self,
        resampling_frequency: Option<Frequency>,
        realizations: Option<&[i64]>,
        date_span: DateSpan,
    ) -> Result<Vec<DateTime<Utc>>, ProviderError> {
        reject_resampling(resampling_frequency)?;
        let table = self.state.read_vectors(&[], realizations)?;
        combine_dates(&table, None, date_span)
    }

    fn get_vectors_df(
        &self,
        vector_names: &[&str],
        resampling: Option<ResamplingOptions>,
        realizations: Option<&[i64]>,
    ) -> Result<RecordBatch, ProviderError> {
        reject_resampling(resampling.map(|opts| opts.frequency))?;
        self.state.check_vector_names(vector_names)?;
        self.state.read_vectors(vector_names, realizations)
    }

    /// Rows stored exactly at `date`; empty when `date` is not a grid point.
    fn get_vectors_for_date_df(
        &self,
        date: DateTime<Utc>,
        vector_names: &[&str],
        realizations: Option<&[i64]>,
    ) -> Result<RecordBatch, ProviderError> {
        self.state.check_vector_names(vector_names)?;
        let table = self.state.read_vectors(vector_names, realizations)?;

        let query = date.timestamp_millis();
        let mask: BooleanArray = date_values(&table)
            .context(TableSnafu)?
            .iter()
            .map(|&d| Some(d == query))
            .collect();
        let at_date = filter_record_batch(&table, &mask).context(ArrowSnafu)?;
        drop_date_column(&at_date)
    }
}
