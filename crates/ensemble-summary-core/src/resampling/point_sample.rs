//! Values of every realization at one query date.
//!
//! Works directly on a `REAL`-segmented table without resampling it. For
//! each realization:
//!
//! - before its first date: first value, or `0` for rates;
//! - after its last date: last value, or `0` for rates;
//! - on a stored date: that row's value;
//! - between two dates: the later value for rates, a linear blend otherwise.
use chrono::{DateTime, Utc};

use arrow::record_batch::RecordBatch;

use crate::resampling::interpolate::blend;
use crate::resampling::resample::{assemble, vector_columns};
use crate::table::{access::date_values, error::TableError, segments::realization_segments};

fn sample_segment(dates: &[i64], values: &[f64], is_rate: bool, query: i64) -> f64 {
    let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
        return f64::NAN;
    };
    if query < first {
        return if is_rate { 0.0 } else { values[0] };
    }
    if query > last {
        return if is_rate { 0.0 } else { values[values.len() - 1] };
    }

    let idx = dates.partition_point(|&d| d < query);
    if dates[idx] == query || is_rate {
        return values[idx];
    }
    blend(dates[idx - 1], dates[idx], values[idx - 1], values[idx], query)
}

/// Sample each realization of `table` at `date`.
///
/// Returns one row per realization in ascending `REAL` order, with `DATE`
/// set to `date` on every row and one column per vector of the input.
pub fn sample_segmented_multi_real_table_at_date(
    table: &RecordBatch,
    date: DateTime<Utc>,
) -> Result<RecordBatch, TableError> {
    let query = date.timestamp_millis();
    let dates = date_values(table)?;
    let segments = realization_segments(table)?;
    let vectors = vector_columns(table)?;

    let values = vectors
        .iter()
        .map(|vector| {
            segments
                .iter()
                .map(|seg| {
                    sample_segment(
                        &dates[seg.range()],
                        &vector.values[seg.range()],
                        vector.is_rate,
                        query,
                    )
                })
                .collect()
        })
        .collect();

    assemble(
        table,
        vec![query; segments.len()],
        Some(segments.iter().map(|seg| seg.realization).collect()),
        &vectors,
        values,
    )
}
