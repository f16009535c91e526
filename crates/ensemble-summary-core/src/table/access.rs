//! Typed column access and table assembly helpers.
//!
//! Timestamps in this layer are epoch milliseconds (`i64`), which is the
//! physical representation of the `DATE` column. Conversion to calendar types
//! happens only where calendar arithmetic is needed (grid generation) or at
//! the public provider boundary.
use std::{collections::HashSet, sync::Arc};

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int64Array,
    TimestampMillisecondArray,
};
use arrow::compute::{cast, filter_record_batch};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDateTime, Utc};
use snafu::prelude::*;

use crate::common::columns::{DATE_COLUMN, REAL_COLUMN, is_reserved_column};
use crate::table::error::{
    ArrowSnafu, DateOutOfRangeSnafu, MissingColumnSnafu, NullValuesSnafu, TableError,
    UnexpectedColumnTypeSnafu,
};

/// Locate a column by name.
pub fn column_index(table: &RecordBatch, name: &str) -> Result<usize, TableError> {
    table
        .schema_ref()
        .index_of(name)
        .ok()
        .context(MissingColumnSnafu { column: name })
}

/// Borrow the `DATE` column as epoch milliseconds.
///
/// The column must be `Timestamp(Millisecond, _)` without nulls.
pub fn date_values(table: &RecordBatch) -> Result<&[i64], TableError> {
    let col = table.column(column_index(table, DATE_COLUMN)?);
    let arr = col
        .as_any()
        .downcast_ref::<TimestampMillisecondArray>()
        .context(UnexpectedColumnTypeSnafu {
            column: DATE_COLUMN,
            datatype: col.data_type().clone(),
            expected: "Timestamp(Millisecond, _)",
        })?;
    ensure!(
        arr.null_count() == 0,
        NullValuesSnafu {
            column: DATE_COLUMN,
            null_count: arr.null_count(),
        }
    );
    Ok(&arr.values()[..])
}

/// Borrow the `REAL` column as realization ids.
///
/// The column must be `Int64` without nulls.
pub fn real_values(table: &RecordBatch) -> Result<&[i64], TableError> {
    let col = table.column(column_index(table, REAL_COLUMN)?);
    let arr = col
        .as_any()
        .downcast_ref::<Int64Array>()
        .context(UnexpectedColumnTypeSnafu {
            column: REAL_COLUMN,
            datatype: col.data_type().clone(),
            expected: "Int64",
        })?;
    ensure!(
        arr.null_count() == 0,
        NullValuesSnafu {
            column: REAL_COLUMN,
            null_count: arr.null_count(),
        }
    );
    Ok(&arr.values()[..])
}

/// Returns `true` for the Arrow types accepted as summary vector columns.
pub fn is_vector_data_type(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Float32 | DataType::Float64)
}

/// Indices of all summary vector columns (everything except reserved columns).
pub fn vector_column_indices(schema: &Schema) -> Vec<usize> {
    schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| !is_reserved_column(f.name()))
        .map(|(idx, _)| idx)
        .collect()
}

/// Copy a float vector column into `f64`s, mapping nulls to `NaN`.
pub(crate) fn float_values(table: &RecordBatch, index: usize) -> Result<Vec<f64>, TableError> {
    let field = table.schema_ref().field(index);
    let col = table.column(index);
    let type_error = || {
        UnexpectedColumnTypeSnafu {
            column: field.name().as_str(),
            datatype: col.data_type().clone(),
            expected: "Float32 or Float64",
        }
        .build()
    };

    match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(type_error)?;
            Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(type_error)?;
            Ok(arr
                .iter()
                .map(|v| v.map(f64::from).unwrap_or(f64::NAN))
                .collect())
        }
        _ => Err(type_error()),
    }
}

/// Canonical `DATE` field of stored tables.
pub fn date_field() -> Field {
    Field::new(
        DATE_COLUMN,
        DataType::Timestamp(TimeUnit::Millisecond, None),
        false,
    )
}

/// Canonical `REAL` field of stored tables.
pub fn real_field() -> Field {
    Field::new(REAL_COLUMN, DataType::Int64, false)
}

/// Build a `DATE` array with the same timezone annotation as `field`.
pub(crate) fn date_array_like(field: &Field, millis: Vec<i64>) -> ArrayRef {
    let tz = match field.data_type() {
        DataType::Timestamp(_, tz) => tz.clone(),
        _ => None,
    };
    Arc::new(TimestampMillisecondArray::from(millis).with_timezone_opt(tz))
}

/// Build a float array with the data type of `field` from `f64` values.
pub(crate) fn float_array_like(field: &Field, values: Vec<f64>) -> Result<ArrayRef, TableError> {
    let arr: ArrayRef = Arc::new(Float64Array::from(values));
    match field.data_type() {
        DataType::Float64 => Ok(arr),
        other => cast(&arr, other).context(ArrowSnafu),
    }
}

/// Keep only rows whose `REAL` value is in `realizations`; row order is preserved.
pub fn filter_realizations(
    table: &RecordBatch,
    realizations: &[i64],
) -> Result<RecordBatch, TableError> {
    let wanted: HashSet<i64> = realizations.iter().copied().collect();
    let mask: BooleanArray = real_values(table)?
        .iter()
        .map(|r| Some(wanted.contains(r)))
        .collect();
    filter_record_batch(table, &mask).context(ArrowSnafu)
}

/// Project `table` onto `columns`, in the given order.
pub fn select_columns(table: &RecordBatch, columns: &[&str]) -> Result<RecordBatch, TableError> {
    let indices = columns
        .iter()
        .map(|name| column_index(table, name))
        .collect::<Result<Vec<_>, _>>()?;
    table.project(&indices).context(ArrowSnafu)
}

/// Convert epoch milliseconds to a UTC datetime.
pub fn datetime_from_millis(millis: i64) -> Result<DateTime<Utc>, TableError> {
    DateTime::from_timestamp_millis(millis).context(DateOutOfRangeSnafu { millis })
}

pub(crate) fn naive_from_millis(millis: i64) -> Result<NaiveDateTime, TableError> {
    datetime_from_millis(millis).map(|dt| dt.naive_utc())
}

pub(crate) fn millis_from_naive(naive: NaiveDateTime) -> i64 {
    naive.and_utc().timestamp_millis()
}

/// Render epoch milliseconds for error messages and logs.
pub(crate) fn describe_millis(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.naive_utc().to_string(),
        None => format!("{millis} ms"),
    }
}
