//! State shared by both provider variants: the opened store plus everything
//! discovered from it at open time.
use std::collections::{BTreeSet, HashMap};

use arrow::record_batch::RecordBatch;
use log::{debug, info, warn};
use snafu::prelude::*;

use crate::common::columns::{DATE_COLUMN, REAL_COLUMN, is_reserved_column};
use crate::metadata::{PerVectorMinMax, VectorMetadata};
use crate::provider::error::{
    EmptyVectorNamesSnafu, ProviderError, StoreSnafu, TableSnafu, UnknownVectorSnafu,
};
use crate::storage::StoreLocation;
use crate::store::{BackingStore, MinMaxIndexSnafu, NoRealizationsSnafu, NoVectorsSnafu};
use crate::table::access::{filter_realizations, real_values};

/// An opened backing store with its cached vector and realization sets.
///
/// Everything here is computed once when the store is opened and never
/// invalidated; a rewritten store needs a new provider.
#[derive(Debug)]
pub(crate) struct StoreState {
    store: BackingStore,
    vector_names: Vec<String>,
    realizations: Vec<i64>,
    metadata: HashMap<String, VectorMetadata>,
    min_max: PerVectorMinMax,
}

impl StoreState {
    /// Open the store for `key`; `Ok(None)` if it has not been written.
    pub(crate) fn open(location: &StoreLocation, key: &str) -> Result<Option<Self>, ProviderError> {
        let Some(store) = BackingStore::open(location, key).context(StoreSnafu)? else {
            return Ok(None);
        };
        let path = store.path().display().to_string();
        let schema = store.schema().clone();

        let vector_names: Vec<String> = schema
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .filter(|name| !is_reserved_column(name))
            .collect();
        ensure!(
            !vector_names.is_empty(),
            NoVectorsSnafu { path: path.as_str() }
        );

        let reals = store.read_columns(&[REAL_COLUMN]).context(StoreSnafu)?;
        let unique: BTreeSet<i64> = real_values(&reals)
            .context(TableSnafu)?
            .iter()
            .copied()
            .collect();
        let realizations: Vec<i64> = unique.into_iter().collect();
        ensure!(
            !realizations.is_empty(),
            NoRealizationsSnafu { path: path.as_str() }
        );

        let metadata = schema
            .fields()
            .iter()
            .filter(|f| !is_reserved_column(f.name()))
            .filter_map(|f| VectorMetadata::from_field(f).map(|md| (f.name().clone(), md)))
            .collect();

        let min_max = match PerVectorMinMax::from_schema_metadata(schema.metadata())
            .context(MinMaxIndexSnafu)
            .context(StoreSnafu)?
        {
            Some(index) => index,
            None => {
                warn!("backing store {path} has no per-vector min/max index; value filters keep every vector");
                PerVectorMinMax::default()
            }
        };

        info!(
            "provider ready for {path}: {} row(s), {} vector(s), {} realization(s)",
            store.num_rows(),
            vector_names.len(),
            realizations.len()
        );
        Ok(Some(Self {
            store,
            vector_names,
            realizations,
            metadata,
            min_max,
        }))
    }

    pub(crate) fn vector_names(&self) -> &[String] {
        &self.vector_names
    }

    /// Vector names minus those the min/max index proves all-zero or constant.
    ///
    /// Vectors without an index entry (no finite values) are always kept.
    pub(crate) fn vector_names_filtered_by_value(
        &self,
        exclude_all_values_zero: bool,
        exclude_constant_values: bool,
    ) -> Vec<String> {
        self.vector_names
            .iter()
            .filter(|name| match self.min_max.get(name) {
                Some(mm) => {
                    !(exclude_all_values_zero && mm.is_all_zero()
                        || exclude_constant_values && mm.is_constant())
                }
                None => true,
            })
            .cloned()
            .collect()
    }

    pub(crate) fn realizations(&self) -> &[i64] {
        &self.realizations
    }

    pub(crate) fn vector_metadata(&self, vector_name: &str) -> Option<VectorMetadata> {
        self.metadata.get(vector_name).cloned()
    }

    /// Reject an empty request or names the store does not hold.
    pub(crate) fn check_vector_names(&self, vector_names: &[&str]) -> Result<(), ProviderError> {
        ensure!(!vector_names.is_empty(), EmptyVectorNamesSnafu);
        for name in vector_names {
            ensure!(
                !is_reserved_column(name) && self.vector_names.iter().any(|v| v.as_str() == *name),
                UnknownVectorSnafu { name: *name }
            );
        }
        Ok(())
    }

    /// Read `DATE`, `REAL` and `vector_names`, keeping only `realizations`
    /// when given. Stored row order is preserved.
    pub(crate) fn read_vectors(
        &self,
        vector_names: &[&str],
        realizations: Option<&[i64]>,
    ) -> Result<RecordBatch, ProviderError> {
        let mut columns = Vec::with_capacity(vector_names.len() + 2);
        columns.extend([DATE_COLUMN, REAL_COLUMN]);
        columns.extend_from_slice(vector_names);

        let table = self.store.read_columns(&columns).context(StoreSnafu)?;
        let table = match realizations {
            Some(wanted) => {
                self.warn_absent_realizations(wanted);
                filter_realizations(&table, wanted).context(TableSnafu)?
            }
            None => table,
        };
        debug!(
            "read {} row(s) of {} vector(s) from {}",
            table.num_rows(),
            vector_names.len(),
            self.store.path().display()
        );
        Ok(table)
    }

    fn warn_absent_realizations(&self, wanted: &[i64]) {
        let absent: Vec<i64> = wanted
            .iter()
            .copied()
            .filter(|r| self.realizations.binary_search(r).is_err())
            .collect();
        if !absent.is_empty() {
            warn!(
                "realization(s) {absent:?} requested but not present in {}",
                self.store.path().display()
            );
        }
    }
}
