//! Whole-table resampling onto normalized grids.
//!
//! Rate vectors (field metadata `is_rate`) are backfilled with zero outside
//! the known range; every other vector is interpolated linearly with edge
//! clamping. Output columns are `DATE`, `REAL` (when present in the input)
//! and the input's vector columns in input order, each keeping its Arrow
//! type and field metadata.
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array};
use arrow::datatypes::{FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use log::debug;
use snafu::prelude::*;

use crate::common::columns::{DATE_COLUMN, REAL_COLUMN};
use crate::common::frequency::{DateSpan, Frequency};
use crate::metadata::vector_metadata::is_rate_from_field;
use crate::resampling::grid::{
    find_intersection_of_normalized_dates, find_union_of_normalized_dates, normalized_grid,
};
use crate::resampling::interpolate::{interpolate_backfill, interpolate_linear};
use crate::table::{
    access::{
        column_index, date_array_like, date_values, float_array_like, float_values,
        vector_column_indices,
    },
    error::{ArrowSnafu, TableError},
    segments::{RealizationSegment, realization_segments},
};

/// A vector column copied out of a table, ready for per-segment slicing.
pub(super) struct VectorColumn {
    pub(super) field: FieldRef,
    pub(super) is_rate: bool,
    pub(super) values: Vec<f64>,
}

pub(super) fn vector_columns(table: &RecordBatch) -> Result<Vec<VectorColumn>, TableError> {
    let schema = table.schema();
    vector_column_indices(&schema)
        .into_iter()
        .map(|idx| {
            let field = Arc::clone(&schema.fields()[idx]);
            Ok(VectorColumn {
                is_rate: is_rate_from_field(&field),
                values: float_values(table, idx)?,
                field,
            })
        })
        .collect()
}

/// Assemble an output table shaped like `table`: `DATE`, optional `REAL`,
/// then the vector columns.
pub(super) fn assemble(
    table: &RecordBatch,
    dates: Vec<i64>,
    reals: Option<Vec<i64>>,
    vectors: &[VectorColumn],
    values: Vec<Vec<f64>>,
) -> Result<RecordBatch, TableError> {
    let schema = table.schema();
    let date_field = Arc::clone(&schema.fields()[column_index(table, DATE_COLUMN)?]);

    let mut fields: Vec<FieldRef> = vec![Arc::clone(&date_field)];
    let mut columns: Vec<ArrayRef> = vec![date_array_like(&date_field, dates)];

    if let Some(reals) = reals {
        fields.push(Arc::clone(&schema.fields()[column_index(table, REAL_COLUMN)?]));
        columns.push(Arc::new(Int64Array::from(reals)));
    }

    for (vector, values) in vectors.iter().zip(values) {
        columns.push(float_array_like(&vector.field, values)?);
        fields.push(Arc::clone(&vector.field));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).context(ArrowSnafu)
}

fn resample_segments(
    table: &RecordBatch,
    segments: &[RealizationSegment],
    with_real: bool,
    frequency: Frequency,
    shared_grid: Option<&[i64]>,
) -> Result<RecordBatch, TableError> {
    let dates = date_values(table)?;
    let vectors = vector_columns(table)?;

    let mut out_dates = Vec::new();
    let mut out_reals = Vec::new();
    let mut out_values: Vec<Vec<f64>> = vec![Vec::new(); vectors.len()];

    for seg in segments {
        let seg_dates = &dates[seg.range()];
        let (Some(&first), Some(&last)) = (seg_dates.first(), seg_dates.last()) else {
            continue;
        };

        let own_grid;
        let grid = match shared_grid {
            Some(grid) => grid,
            None => {
                own_grid = normalized_grid(first, last, frequency)?;
                own_grid.as_slice()
            }
        };

        out_dates.extend_from_slice(grid);
        out_reals.extend(std::iter::repeat_n(seg.realization, grid.len()));

        for (vector, out) in vectors.iter().zip(out_values.iter_mut()) {
            let known = &vector.values[seg.range()];
            let resampled = if vector.is_rate {
                interpolate_backfill(grid, seg_dates, known, 0.0, 0.0)
            } else {
                interpolate_linear(grid, seg_dates, known)
            };
            out.extend(resampled);
        }
    }

    debug!(
        "resampled {} realization(s) at {frequency} frequency into {} row(s)",
        segments.len(),
        out_dates.len()
    );

    assemble(
        table,
        out_dates,
        with_real.then_some(out_reals),
        &vectors,
        out_values,
    )
}

/// Resample one realization's table onto its own normalized grid.
///
/// The table may or may not carry a `REAL` column; when it does, the column
/// must hold a single realization id, which is repeated on every output row.
/// An empty table resamples to an empty table.
pub fn resample_single_real_table(
    table: &RecordBatch,
    frequency: Frequency,
) -> Result<RecordBatch, TableError> {
    if table.schema_ref().index_of(REAL_COLUMN).is_ok() {
        let segments = realization_segments(table)?;
        return resample_segments(table, &segments, true, frequency, None);
    }

    let whole = RealizationSegment {
        realization: 0,
        offset: 0,
        len: table.num_rows(),
    };
    let segments: &[RealizationSegment] = if whole.len > 0 {
        std::slice::from_ref(&whole)
    } else {
        &[]
    };
    resample_segments(table, segments, false, frequency, None)
}

/// Resample a `REAL`-segmented table, one realization at a time.
///
/// With `date_span` set, every realization is sampled on one shared grid: the
/// normalized union or intersection of the realizations' date ranges. An
/// empty intersection yields an empty table. Without it, each realization
/// gets its own grid. Output rows are ordered by ascending `REAL`, then date.
pub fn resample_segmented_multi_real_table(
    table: &RecordBatch,
    frequency: Frequency,
    date_span: Option<DateSpan>,
) -> Result<RecordBatch, TableError> {
    let segments = realization_segments(table)?;
    let shared = match date_span {
        Some(DateSpan::Intersection) => Some(find_intersection_of_normalized_dates(table, frequency)?),
        Some(DateSpan::Union) => Some(find_union_of_normalized_dates(table, frequency)?),
        None => None,
    };
    resample_segments(table, &segments, true, frequency, shared.as_deref())
}
