//! Building and persisting backing store tables.
//!
//! Per-realization input tables carry `DATE` and vector columns. Building
//! the store table:
//!
//! 1. validates every realization (typed `DATE`, no `REAL`, float vectors
//!    with one type per vector, strictly increasing dates),
//! 2. optionally resamples each realization to a fixed frequency,
//! 3. unions the vector columns in first-appearance order, null-filling
//!    vectors a realization lacks,
//! 4. tags rows with `REAL`, concatenates and sorts them, and
//! 5. stores the per-vector min/max index in the schema metadata.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{
    Array, ArrayRef, Int64Array, StringArray, TimestampMillisecondArray, new_null_array,
};
use arrow::compute::{SortColumn, cast, concat_batches, lexsort_to_indices, take_record_batch};
use arrow::datatypes::{DataType, FieldRef, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use log::info;
use parquet::arrow::ArrowWriter;
use snafu::prelude::*;

use crate::common::columns::{DATE_COLUMN, ENSEMBLE_COLUMN, REAL_COLUMN, is_reserved_column};
use crate::common::frequency::Frequency;
use crate::metadata::PerVectorMinMax;
use crate::resampling::resample::resample_single_real_table;
use crate::storage::{self, StoreLocation};
use crate::store::{
    ArrowSnafu, BackingStoreError, EmptyInputSnafu, InconsistentColumnTypeSnafu,
    MinMaxIndexSnafu, MissingDateColumnSnafu, MissingEnsembleDataframeColumnSnafu,
    MultipleEnsemblesSnafu, NonMonotonicDatesSnafu, ParquetSnafu, RealColumnAlreadyPresentSnafu,
    StorageSnafu, TableSnafu, UnsupportedDateTypeSnafu,
    UnsupportedEnsembleDataframeColumnTypeSnafu, UnsupportedVectorTypeSnafu, store_file_name,
    writer_properties,
};
use crate::table::{
    access::{
        column_index, date_field, date_values, describe_millis, is_vector_data_type, real_field,
        real_values,
    },
    dates::first_non_increasing_pair,
    segments::find_realization_segments,
};

/// Physical row order of a store table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// Rows grouped by realization, dates ascending inside each group.
    ///
    /// Required by the lazy provider, which slices rows per realization.
    RealizationThenDate,
    /// Rows ordered by date, realizations ascending for each date.
    DateThenRealization,
}

fn check_date_column(realization: i64, table: &RecordBatch) -> Result<(), BackingStoreError> {
    let schema = table.schema_ref();
    let idx = schema
        .index_of(DATE_COLUMN)
        .ok()
        .context(MissingDateColumnSnafu { realization })?;
    let datatype = schema.field(idx).data_type();
    ensure!(
        matches!(datatype, DataType::Timestamp(TimeUnit::Millisecond, _)),
        UnsupportedDateTypeSnafu {
            realization,
            datatype: datatype.clone(),
        }
    );
    Ok(())
}

fn check_strictly_increasing(realization: i64, dates: &[i64]) -> Result<(), BackingStoreError> {
    if let Some((first, second)) = first_non_increasing_pair(dates) {
        return NonMonotonicDatesSnafu {
            realization,
            first: describe_millis(first),
            second: describe_millis(second),
        }
        .fail();
    }
    Ok(())
}

/// Validate one realization table and reduce it to `DATE` plus its vectors.
///
/// The returned `DATE` column is `Timestamp(Millisecond, None)` holding the
/// same instants as the input.
fn normalize_realization(
    realization: i64,
    table: &RecordBatch,
    vector_types: &mut HashMap<String, DataType>,
) -> Result<RecordBatch, BackingStoreError> {
    check_date_column(realization, table)?;
    ensure!(
        table.schema_ref().index_of(REAL_COLUMN).is_err(),
        RealColumnAlreadyPresentSnafu { realization }
    );

    let dates = date_values(table).context(TableSnafu)?;
    check_strictly_increasing(realization, dates)?;

    let mut fields: Vec<FieldRef> = vec![Arc::new(date_field())];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(TimestampMillisecondArray::from(
        dates.to_vec(),
    ))];

    for (field, column) in table.schema_ref().fields().iter().zip(table.columns()) {
        if is_reserved_column(field.name()) {
            continue;
        }
        let datatype = field.data_type();
        ensure!(
            is_vector_data_type(datatype),
            UnsupportedVectorTypeSnafu {
                realization,
                column: field.name().as_str(),
                datatype: datatype.clone(),
            }
        );
        if let Some(expected) = vector_types.get(field.name()) {
            ensure!(
                expected == datatype,
                InconsistentColumnTypeSnafu {
                    realization,
                    column: field.name().as_str(),
                    expected: expected.clone(),
                    found: datatype.clone(),
                }
            );
        } else {
            vector_types.insert(field.name().clone(), datatype.clone());
        }
        fields.push(Arc::new(field.as_ref().clone().with_nullable(true)));
        columns.push(Arc::clone(column));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).context(ArrowSnafu)
}

/// Union of vector fields across tables, in first-appearance order.
fn union_vector_fields<'a>(tables: impl Iterator<Item = &'a RecordBatch>) -> Vec<FieldRef> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for table in tables {
        for field in table.schema_ref().fields() {
            if !is_reserved_column(field.name()) && seen.insert(field.name().clone()) {
                out.push(Arc::clone(field));
            }
        }
    }
    out
}

/// Lay one normalized realization table out in the store schema.
fn conform_to_schema(
    realization: i64,
    table: &RecordBatch,
    schema: &SchemaRef,
) -> Result<RecordBatch, BackingStoreError> {
    let rows = table.num_rows();
    let columns = schema
        .fields()
        .iter()
        .map(|field| -> ArrayRef {
            match field.name().as_str() {
                REAL_COLUMN => Arc::new(Int64Array::from(vec![realization; rows])),
                name => match table.column_by_name(name) {
                    Some(column) => Arc::clone(column),
                    None => new_null_array(field.data_type(), rows),
                },
            }
        })
        .collect();
    RecordBatch::try_new(Arc::clone(schema), columns).context(ArrowSnafu)
}

fn sort_rows(table: &RecordBatch, order: RowOrder) -> Result<RecordBatch, BackingStoreError> {
    let column = |name: &str| -> Result<&ArrayRef, BackingStoreError> {
        let idx = column_index(table, name).context(TableSnafu)?;
        Ok(table.column(idx))
    };
    let date = column(DATE_COLUMN)?;
    let real = column(REAL_COLUMN)?;
    let keys = match order {
        RowOrder::RealizationThenDate => [real, date],
        RowOrder::DateThenRealization => [date, real],
    };
    let sort_columns: Vec<SortColumn> = keys
        .into_iter()
        .map(|values| SortColumn {
            values: Arc::clone(values),
            options: None,
        })
        .collect();
    let indices = lexsort_to_indices(&sort_columns, None).context(ArrowSnafu)?;
    take_record_batch(table, &indices).context(ArrowSnafu)
}

/// Compute the min/max index and attach it to the schema metadata.
fn attach_min_max_index(table: RecordBatch) -> Result<RecordBatch, BackingStoreError> {
    let index = PerVectorMinMax::compute(&table);
    let mut metadata = table.schema_ref().metadata().clone();
    index
        .insert_into_schema_metadata(&mut metadata)
        .context(MinMaxIndexSnafu)?;
    let schema = Arc::new(table.schema_ref().as_ref().clone().with_metadata(metadata));
    table.with_schema(schema).context(ArrowSnafu)
}

/// Build a store table from per-realization tables.
///
/// With `frequency` set, each realization is resampled onto its own
/// normalized grid before the tables are combined.
pub fn build_store_table(
    per_realization: &BTreeMap<i64, RecordBatch>,
    order: RowOrder,
    frequency: Option<Frequency>,
) -> Result<RecordBatch, BackingStoreError> {
    ensure!(!per_realization.is_empty(), EmptyInputSnafu);

    let mut vector_types = HashMap::new();
    let mut normalized = Vec::with_capacity(per_realization.len());
    for (&realization, table) in per_realization {
        let mut table = normalize_realization(realization, table, &mut vector_types)?;
        if let Some(frequency) = frequency {
            table = resample_single_real_table(&table, frequency).context(TableSnafu)?;
        }
        normalized.push((realization, table));
    }

    let mut fields: Vec<FieldRef> = vec![Arc::new(date_field()), Arc::new(real_field())];
    fields.extend(union_vector_fields(normalized.iter().map(|(_, t)| t)));
    let schema: SchemaRef = Arc::new(Schema::new(fields));

    let batches = normalized
        .iter()
        .map(|(realization, table)| conform_to_schema(*realization, table, &schema))
        .collect::<Result<Vec<_>, _>>()?;
    let combined = concat_batches(&schema, &batches).context(ArrowSnafu)?;

    // Realizations were appended in ascending order with sorted dates.
    let sorted = match order {
        RowOrder::RealizationThenDate => combined,
        RowOrder::DateThenRealization => sort_rows(&combined, order)?,
    };
    attach_min_max_index(sorted)
}

fn distinct_ensembles(column: &ArrayRef) -> Result<Vec<String>, BackingStoreError> {
    let strings = cast(column, &DataType::Utf8).context(ArrowSnafu)?;
    let mut distinct = BTreeSet::new();
    if let Some(arr) = strings.as_any().downcast_ref::<StringArray>() {
        distinct.extend(arr.iter().flatten().map(str::to_string));
    }
    Ok(distinct.into_iter().collect())
}

/// Build a store table from one combined table holding `DATE`, `REAL`,
/// `ENSEMBLE` and vector columns.
///
/// At most one distinct `ENSEMBLE` value is accepted; the column is dropped.
/// Dates must be unique within each realization. The input row order is
/// irrelevant: rows are sorted by `order`.
pub fn build_store_table_from_ensemble_dataframe(
    table: &RecordBatch,
    order: RowOrder,
) -> Result<RecordBatch, BackingStoreError> {
    let ensemble = table
        .column_by_name(ENSEMBLE_COLUMN)
        .context(MissingEnsembleDataframeColumnSnafu {
            column: ENSEMBLE_COLUMN,
        })?;
    let ensembles = distinct_ensembles(ensemble)?;
    ensure!(ensembles.len() <= 1, MultipleEnsemblesSnafu { ensembles });

    let real = table
        .column_by_name(REAL_COLUMN)
        .context(MissingEnsembleDataframeColumnSnafu {
            column: REAL_COLUMN,
        })?;
    let real = cast(real, &DataType::Int64).context(ArrowSnafu)?;

    let date = table
        .column_by_name(DATE_COLUMN)
        .context(MissingEnsembleDataframeColumnSnafu {
            column: DATE_COLUMN,
        })?;
    ensure!(
        matches!(date.data_type(), DataType::Timestamp(TimeUnit::Millisecond, _)),
        UnsupportedEnsembleDataframeColumnTypeSnafu {
            column: DATE_COLUMN,
            datatype: date.data_type().clone(),
        }
    );
    let dates = date_values(table).context(TableSnafu)?;

    let mut fields: Vec<FieldRef> = vec![Arc::new(date_field()), Arc::new(real_field())];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(TimestampMillisecondArray::from(dates.to_vec())),
        real,
    ];
    for (field, column) in table.schema_ref().fields().iter().zip(table.columns()) {
        if is_reserved_column(field.name()) {
            continue;
        }
        ensure!(
            is_vector_data_type(field.data_type()),
            UnsupportedEnsembleDataframeColumnTypeSnafu {
                column: field.name().as_str(),
                datatype: field.data_type().clone(),
            }
        );
        fields.push(Arc::new(field.as_ref().clone().with_nullable(true)));
        columns.push(Arc::clone(column));
    }
    let combined =
        RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).context(ArrowSnafu)?;

    let by_real = sort_rows(&combined, RowOrder::RealizationThenDate)?;
    let dates = date_values(&by_real).context(TableSnafu)?;
    for seg in find_realization_segments(real_values(&by_real).context(TableSnafu)?) {
        check_strictly_increasing(seg.realization, &dates[seg.range()])?;
    }

    let sorted = match order {
        RowOrder::RealizationThenDate => by_real,
        RowOrder::DateThenRealization => sort_rows(&by_real, order)?,
    };
    attach_min_max_index(sorted)
}

/// Persist `table` as the backing store for `key` under `location`.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// concurrent reader sees either the previous store or the complete new one.
/// Returns the absolute path of the written store.
pub fn write_store_table(
    location: &StoreLocation,
    key: &str,
    table: &RecordBatch,
) -> Result<PathBuf, BackingStoreError> {
    let started = Instant::now();
    let rel_path = store_file_name(key)?;
    let abs_path = location.resolve(&rel_path);
    let path = abs_path.display().to_string();

    let mut writer = ArrowWriter::try_new(Vec::new(), table.schema(), Some(writer_properties()))
        .context(ParquetSnafu { path: path.as_str() })?;
    writer
        .write(table)
        .context(ParquetSnafu { path: path.as_str() })?;
    let bytes = writer
        .into_inner()
        .context(ParquetSnafu { path: path.as_str() })?;

    storage::write_atomic(location, &rel_path, &bytes).context(StorageSnafu)?;

    info!(
        "wrote backing store {path}: {} row(s), {} column(s), {} byte(s) in {:?}",
        table.num_rows(),
        table.num_columns(),
        bytes.len(),
        started.elapsed()
    );
    Ok(abs_path)
}
