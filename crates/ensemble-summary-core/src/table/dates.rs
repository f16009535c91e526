//! Date set algebra over a table's `DATE` and `REAL` columns.
//!
//! All functions return epoch milliseconds sorted ascending. They do not
//! require the table to be sorted or segmented by realization.
use std::collections::{BTreeMap, BTreeSet};

use arrow::record_batch::RecordBatch;

use crate::table::{
    access::{date_values, real_values},
    error::TableError,
};

/// Returns `true` iff every successive pair of dates strictly increases.
///
/// Intended for single-realization tables (or one realization's segment).
pub fn is_date_column_monotonically_increasing(table: &RecordBatch) -> Result<bool, TableError> {
    Ok(date_values(table)?.windows(2).all(|w| w[0] < w[1]))
}

/// Returns the first adjacent `(date[i], date[i + 1])` pair (by position) where
/// the date does not increase, or `None` if the column is strictly increasing.
pub fn find_first_non_increasing_date_pair(
    table: &RecordBatch,
) -> Result<Option<(i64, i64)>, TableError> {
    Ok(first_non_increasing_pair(date_values(table)?))
}

pub(crate) fn first_non_increasing_pair(dates: &[i64]) -> Option<(i64, i64)> {
    dates
        .windows(2)
        .find(|w| w[0] >= w[1])
        .map(|w| (w[0], w[1]))
}

fn unique_dates_per_realization(
    table: &RecordBatch,
) -> Result<BTreeMap<i64, BTreeSet<i64>>, TableError> {
    let dates = date_values(table)?;
    let reals = real_values(table)?;

    let mut per_real: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
    for (&real, &date) in reals.iter().zip(dates) {
        per_real.entry(real).or_default().insert(date);
    }
    Ok(per_real)
}

/// Dates present for every realization in the table.
///
/// Empty if the table has no rows or the realizations share no date.
pub fn find_intersection_of_realization_dates(table: &RecordBatch) -> Result<Vec<i64>, TableError> {
    let per_real = unique_dates_per_realization(table)?;
    let mut sets = per_real.into_values();

    let Some(mut common) = sets.next() else {
        return Ok(Vec::new());
    };
    for set in sets {
        common.retain(|d| set.contains(d));
        if common.is_empty() {
            break;
        }
    }
    Ok(common.into_iter().collect())
}

/// Dates present for any realization in the table.
pub fn find_union_of_realization_dates(table: &RecordBatch) -> Result<Vec<i64>, TableError> {
    let unique: BTreeSet<i64> = date_values(table)?.iter().copied().collect();
    Ok(unique.into_iter().collect())
}

/// `(min_date, max_date)` per realization, ordered by ascending realization id.
pub fn find_min_max_date_per_realization(
    table: &RecordBatch,
) -> Result<Vec<(i64, i64)>, TableError> {
    let dates = date_values(table)?;
    let reals = real_values(table)?;

    let mut per_real: BTreeMap<i64, (i64, i64)> = BTreeMap::new();
    for (&real, &date) in reals.iter().zip(dates) {
        per_real
            .entry(real)
            .and_modify(|(lo, hi)| {
                *lo = (*lo).min(date);
                *hi = (*hi).max(date);
            })
            .or_insert((date, date));
    }
    Ok(per_real.into_values().collect())
}
