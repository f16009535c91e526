//! Contiguous per-realization row ranges.
//!
//! Stored tables of the lazy provider are segmented by `REAL`: all rows of
//! one realization are contiguous and sorted by `DATE`. Resampling and point
//! sampling operate on these segments, slicing rows per realization instead
//! of filtering the whole table for every realization.
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

use arrow::compute::{SortColumn, lexsort_to_indices, take_record_batch};
use arrow::record_batch::RecordBatch;
use snafu::prelude::*;

use crate::common::columns::{DATE_COLUMN, REAL_COLUMN};
use crate::table::{
    access::{column_index, real_values},
    error::{ArrowSnafu, NotSegmentedByRealizationSnafu, TableError},
};

/// A run of consecutive rows sharing one realization id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealizationSegment {
    /// Realization id of every row in the segment.
    pub realization: i64,
    /// Index of the first row.
    pub offset: usize,
    /// Number of rows; always > 0.
    pub len: usize,
}

impl RealizationSegment {
    /// Row range covered by this segment.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Split a realization column into runs of equal consecutive values.
pub fn find_realization_segments(reals: &[i64]) -> Vec<RealizationSegment> {
    let mut segments: Vec<RealizationSegment> = Vec::new();
    for (row, &real) in reals.iter().enumerate() {
        match segments.last_mut() {
            Some(seg) if seg.realization == real => seg.len += 1,
            _ => segments.push(RealizationSegment {
                realization: real,
                offset: row,
                len: 1,
            }),
        }
    }
    segments
}

/// Find the realization segments of `table`, ordered by ascending realization.
///
/// Fails with [`TableError::NotSegmentedByRealization`] when a realization's
/// rows are not contiguous; [`group_by_realization`] fixes such tables.
pub fn realization_segments(table: &RecordBatch) -> Result<Vec<RealizationSegment>, TableError> {
    let mut segments = find_realization_segments(real_values(table)?);
    segments.sort_by_key(|seg| seg.realization);
    if let Some(w) = segments
        .windows(2)
        .find(|w| w[0].realization == w[1].realization)
    {
        return NotSegmentedByRealizationSnafu {
            realization: w[0].realization,
        }
        .fail();
    }
    Ok(segments)
}

/// `true` if every realization's rows form one contiguous run.
pub fn is_segmented_by_realization(table: &RecordBatch) -> Result<bool, TableError> {
    let mut seen = HashSet::new();
    Ok(find_realization_segments(real_values(table)?)
        .iter()
        .all(|seg| seen.insert(seg.realization)))
}

/// Reorder rows by `(REAL, DATE)` unless the table is already segmented.
///
/// A segmented table is returned unchanged, whatever its run order.
pub fn group_by_realization(table: &RecordBatch) -> Result<RecordBatch, TableError> {
    if is_segmented_by_realization(table)? {
        return Ok(table.clone());
    }
    let sort_columns = [REAL_COLUMN, DATE_COLUMN]
        .into_iter()
        .map(|name| -> Result<SortColumn, TableError> {
            Ok(SortColumn {
                values: Arc::clone(table.column(column_index(table, name)?)),
                options: None,
            })
        })
        .collect::<Result<Vec<_>, TableError>>()?;
    let indices = lexsort_to_indices(&sort_columns, None).context(ArrowSnafu)?;
    take_record_batch(table, &indices).context(ArrowSnafu)
}
