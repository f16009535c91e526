//! Provider that stores raw dates and resamples per query.
use std::collections::BTreeMap;
use std::path::PathBuf;

use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use log::debug;
use snafu::prelude::*;

use crate::common::frequency::{DateSpan, Frequency};
use crate::metadata::VectorMetadata;
use crate::provider::error::{ProviderError, TableSnafu};
use crate::provider::state::StoreState;
use crate::provider::{EnsembleSummaryProvider, ResamplingOptions, combine_dates, drop_date_column};
use crate::resampling::{
    point_sample::sample_segmented_multi_real_table_at_date,
    resample::resample_segmented_multi_real_table,
};
use crate::storage::StoreLocation;
use crate::store::{BackingStoreError, RowOrder, build_store_table, write_store_table};
use crate::table::segments::group_by_realization;

/// Provider over a store of raw, irregular per-realization dates.
///
/// Stores written by this type group rows by realization with dates sorted,
/// so resampling and point sampling slice each realization directly. A store
/// laid out by date (as [`PresampledProvider`](crate::provider::PresampledProvider)
/// writes it) is regrouped per query.
#[derive(Debug)]
pub struct LazyResamplingProvider {
    state: StoreState,
}

impl LazyResamplingProvider {
    /// Build and persist the backing store for `key` from per-realization
    /// tables of `DATE` plus vector columns.
    ///
    /// Returns the path of the written store.
    pub fn write_backing_store_from_per_realization_tables(
        location: &StoreLocation,
        key: &str,
        per_realization: &BTreeMap<i64, RecordBatch>,
    ) -> Result<PathBuf, BackingStoreError> {
        let table = build_store_table(per_realization, RowOrder::RealizationThenDate, None)?;
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

impl EnsembleSummaryProvider for LazyResamplingProvider {
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
        true
    }

    fn dates(
        &self,
        resampling_frequency: Option<Frequency>,
        realizations: Option<&[i64]>,
        date_span: DateSpan,
    ) -> Result<Vec<DateTime<Utc>>, ProviderError> {
        let table = self.state.read_vectors(&[], realizations)?;
        combine_dates(&table, resampling_frequency, date_span)
    }

    fn get_vectors_df(
        &self,
        vector_names: &[&str],
        resampling: Option<ResamplingOptions>,
        realizations: Option<&[i64]>,
    ) -> Result<RecordBatch, ProviderError> {
        self.state.check_vector_names(vector_names)?;
        let table = self.state.read_vectors(vector_names, realizations)?;

        let Some(options) = resampling else {
            return Ok(table);
        };
        let table = group_by_realization(&table).context(TableSnafu)?;
        debug!(
            "resampling {} vector(s) at {} (common date span: {:?})",
            vector_names.len(),
            options.frequency,
            options.common_date_span
        );
        resample_segmented_multi_real_table(&table, options.frequency, options.common_date_span)
            .context(TableSnafu)
    }

    fn get_vectors_for_date_df(
        &self,
        date: DateTime<Utc>,
        vector_names: &[&str],
        realizations: Option<&[i64]>,
    ) -> Result<RecordBatch, ProviderError> {
        self.state.check_vector_names(vector_names)?;
        let table = self.state.read_vectors(vector_names, realizations)?;
        let table = group_by_realization(&table).context(TableSnafu)?;
        let sampled = sample_segmented_multi_real_table_at_date(&table, date).context(TableSnafu)?;
        drop_date_column(&sampled)
    }
}
