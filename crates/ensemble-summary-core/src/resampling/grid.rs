//! Calendar-aligned sample date grids.
//!
//! A grid point is a pure function of the calendar: midnight for
//! [`Frequency::Daily`], Monday midnight for [`Frequency::Weekly`], the 1st of
//! the month for [`Frequency::Monthly`], Jan/Apr/Jul/Oct 1st for
//! [`Frequency::Quarterly`] and Jan 1st for [`Frequency::Yearly`]. Grids built
//! from overlapping ranges therefore share their points, which is what lets
//! realizations with different raw dates be aligned on one x-axis.
//!
//! For a raw interval `[min, max]` the normalized interval is
//! `[truncate(min), ceil(max)]` where `ceil(max)` is `truncate(max)` stepped
//! forward once unless `max` already sits on a grid point.
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, Utc};
use snafu::prelude::*;

use arrow::record_batch::RecordBatch;

use crate::common::frequency::Frequency;
use crate::table::{
    access::{date_values, datetime_from_millis, millis_from_naive, naive_from_millis},
    dates::find_min_max_date_per_realization,
    error::{DateArithmeticOverflowSnafu, ReversedDateIntervalSnafu, TableError},
};

fn first_of_month(date: NaiveDate, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), month, 1)
}

/// Floor `naive` to the grid point at or before it.
fn truncate(naive: NaiveDateTime, frequency: Frequency) -> Option<NaiveDateTime> {
    let date = naive.date();
    let floored = match frequency {
        Frequency::Daily => Some(date),
        Frequency::Weekly => {
            date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        }
        Frequency::Monthly => first_of_month(date, date.month()),
        Frequency::Quarterly => first_of_month(date, (date.month0() / 3) * 3 + 1),
        Frequency::Yearly => first_of_month(date, 1),
    };
    floored.map(|d| d.and_time(chrono::NaiveTime::MIN))
}

/// Advance a grid point by one cadence unit.
fn step(naive: NaiveDateTime, frequency: Frequency) -> Option<NaiveDateTime> {
    match frequency {
        Frequency::Daily => naive.checked_add_days(Days::new(1)),
        Frequency::Weekly => naive.checked_add_days(Days::new(7)),
        Frequency::Monthly => naive.checked_add_months(Months::new(1)),
        Frequency::Quarterly => naive.checked_add_months(Months::new(3)),
        Frequency::Yearly => naive.checked_add_months(Months::new(12)),
    }
}

fn overflow(naive: NaiveDateTime, frequency: Frequency) -> TableError {
    DateArithmeticOverflowSnafu {
        date: naive.to_string(),
        frequency,
    }
    .build()
}

fn truncate_millis(millis: i64, frequency: Frequency) -> Result<NaiveDateTime, TableError> {
    let naive = naive_from_millis(millis)?;
    truncate(naive, frequency).ok_or_else(|| overflow(naive, frequency))
}

fn step_checked(naive: NaiveDateTime, frequency: Frequency) -> Result<NaiveDateTime, TableError> {
    step(naive, frequency).ok_or_else(|| overflow(naive, frequency))
}

/// Normalized `(start, end)` in epoch millis for the raw interval `[min, max]`.
pub(crate) fn normalized_bounds(
    min: i64,
    max: i64,
    frequency: Frequency,
) -> Result<(i64, i64), TableError> {
    let start = truncate_millis(min, frequency)?;
    let mut end = truncate_millis(max, frequency)?;
    if millis_from_naive(end) < max {
        end = step_checked(end, frequency)?;
    }
    Ok((millis_from_naive(start), millis_from_naive(end)))
}

/// Every grid point of the normalized interval of `[min, max]`, in epoch millis.
pub(crate) fn normalized_grid(
    min: i64,
    max: i64,
    frequency: Frequency,
) -> Result<Vec<i64>, TableError> {
    let (start, end) = normalized_bounds(min, max, frequency)?;
    let mut out = Vec::new();
    let mut current = naive_from_millis(start)?;
    loop {
        let millis = millis_from_naive(current);
        if millis > end {
            break;
        }
        out.push(millis);
        current = step_checked(current, frequency)?;
    }
    Ok(out)
}

/// Intersect the normalized versions of raw `(min, max)` intervals.
///
/// `None` if `intervals` is empty or the normalized intervals do not overlap.
pub(crate) fn intersect_normalized_intervals(
    intervals: &[(i64, i64)],
    frequency: Frequency,
) -> Result<Option<(i64, i64)>, TableError> {
    let mut acc: Option<(i64, i64)> = None;
    for &(min, max) in intervals {
        let (start, end) = normalized_bounds(min, max, frequency)?;
        acc = Some(match acc {
            None => (start, end),
            Some((s, e)) => (s.max(start), e.min(end)),
        });
    }
    Ok(acc.filter(|(start, end)| start <= end))
}

fn millis_of(date: DateTime<Utc>) -> i64 {
    date.timestamp_millis()
}

fn ensure_ordered(min: DateTime<Utc>, max: DateTime<Utc>) -> Result<(), TableError> {
    ensure!(
        min <= max,
        ReversedDateIntervalSnafu {
            min: min.naive_utc().to_string(),
            max: max.naive_utc().to_string(),
        }
    );
    Ok(())
}

/// Calendar-aligned grid covering `[min_date, max_date]`.
///
/// The first point is `<= min_date`, the last is `>= max_date`, and
/// consecutive points are one `frequency` unit apart.
pub fn generate_normalized_sample_dates(
    min_date: DateTime<Utc>,
    max_date: DateTime<Utc>,
    frequency: Frequency,
) -> Result<Vec<DateTime<Utc>>, TableError> {
    ensure_ordered(min_date, max_date)?;
    normalized_grid(millis_of(min_date), millis_of(max_date), frequency)?
        .into_iter()
        .map(datetime_from_millis)
        .collect()
}

/// First and last point of the grid [`generate_normalized_sample_dates`]
/// would produce, without materializing it.
pub fn get_normalized_min_max_sample_date(
    min_date: DateTime<Utc>,
    max_date: DateTime<Utc>,
    frequency: Frequency,
) -> Result<(DateTime<Utc>, DateTime<Utc>), TableError> {
    ensure_ordered(min_date, max_date)?;
    let (start, end) = normalized_bounds(millis_of(min_date), millis_of(max_date), frequency)?;
    Ok((datetime_from_millis(start)?, datetime_from_millis(end)?))
}

/// Normalize each raw interval independently, then intersect them.
///
/// Returns `None` for an empty list or when any two normalized intervals
/// fail to overlap.
pub fn calc_intersection_of_normalized_date_intervals(
    intervals: &[(DateTime<Utc>, DateTime<Utc>)],
    frequency: Frequency,
) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, TableError> {
    for &(min, max) in intervals {
        ensure_ordered(min, max)?;
    }
    let raw: Vec<(i64, i64)> = intervals
        .iter()
        .map(|&(min, max)| (millis_of(min), millis_of(max)))
        .collect();
    match intersect_normalized_intervals(&raw, frequency)? {
        Some((start, end)) => Ok(Some((
            datetime_from_millis(start)?,
            datetime_from_millis(end)?,
        ))),
        None => Ok(None),
    }
}

/// Grid over the whole table's date range, in epoch millis.
///
/// Empty for a table without rows.
pub fn find_union_of_normalized_dates(
    table: &RecordBatch,
    frequency: Frequency,
) -> Result<Vec<i64>, TableError> {
    let dates = date_values(table)?;
    let (Some(&min), Some(&max)) = (dates.iter().min(), dates.iter().max()) else {
        return Ok(Vec::new());
    };
    normalized_grid(min, max, frequency)
}

/// Grid over the intersection of every realization's normalized date range,
/// in epoch millis.
///
/// Empty when the table has no rows or the normalized ranges do not overlap.
pub fn find_intersection_of_normalized_dates(
    table: &RecordBatch,
    frequency: Frequency,
) -> Result<Vec<i64>, TableError> {
    let per_real = find_min_max_date_per_realization(table)?;
    match intersect_normalized_intervals(&per_real, frequency)? {
        Some((start, end)) => normalized_grid(start, end, frequency),
        None => Ok(Vec::new()),
    }
}
