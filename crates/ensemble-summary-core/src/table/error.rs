//! Error type for table access, date utilities and resampling.

use arrow::{datatypes::DataType, error::ArrowError};
use snafu::prelude::*;

use crate::common::frequency::Frequency;

/// Errors from operating on in-memory summary tables.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TableError {
    /// A required column is not present in the table.
    #[snafu(display("Missing column {column} in table"))]
    MissingColumn {
        /// Name of the column that was expected.
        column: String,
    },

    /// A column exists but does not have the Arrow type this operation needs.
    #[snafu(display("Column {column} has type {datatype:?}, expected {expected}"))]
    UnexpectedColumnType {
        /// Name of the offending column.
        column: String,
        /// Arrow data type found in the table.
        datatype: DataType,
        /// Human readable description of the accepted type(s).
        expected: String,
    },

    /// A column that must be fully populated contains nulls.
    #[snafu(display("Column {column} contains {null_count} null value(s)"))]
    NullValues {
        /// Name of the offending column.
        column: String,
        /// Number of nulls found.
        null_count: usize,
    },

    /// Rows of one realization are split over more than one contiguous run.
    #[snafu(display("Table is not segmented by REAL: realization {realization} appears in several runs"))]
    NotSegmentedByRealization {
        /// Realization found in more than one run.
        realization: i64,
    },

    /// An epoch-millisecond value cannot be represented as a calendar date.
    #[snafu(display("Timestamp {millis} ms is outside the supported date range"))]
    DateOutOfRange {
        /// Raw epoch-millisecond value.
        millis: i64,
    },

    /// A date interval whose lower bound lies after its upper bound.
    #[snafu(display("Date interval is reversed: {min} > {max}"))]
    ReversedDateInterval {
        /// Lower bound as given.
        min: String,
        /// Upper bound as given.
        max: String,
    },

    /// Stepping a grid date by one cadence unit overflowed the calendar.
    #[snafu(display("Date arithmetic overflow stepping {date} by one {frequency} unit"))]
    DateArithmeticOverflow {
        /// Grid date that could not be stepped.
        date: String,
        /// Cadence being applied.
        frequency: Frequency,
    },

    /// Arrow compute or array construction failed.
    #[snafu(display("Arrow error: {source}"))]
    Arrow {
        /// Underlying Arrow error.
        source: ArrowError,
    },
}
