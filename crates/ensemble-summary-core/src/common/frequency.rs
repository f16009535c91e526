//! Resampling cadence and date span selectors.
//!
//! [`Frequency`] controls how a normalized date grid is laid out (see
//! [`crate::resampling::grid`]); [`DateSpan`] controls whether a
//! multi-realization date query returns the dates common to all selected
//! realizations or the union across them.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

/// Errors produced when parsing a human-friendly frequency (e.g. `monthly`).
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum ParseFrequencyError {
    /// The input was empty or only whitespace.
    #[snafu(display("frequency is empty"))]
    EmptyFrequency,

    /// The input did not name a supported frequency.
    #[snafu(display(
        "unknown frequency '{input}' (expected daily|weekly|monthly|quarterly|yearly)"
    ))]
    UnknownFrequency {
        /// The original input string.
        input: String,
    },
}

/// Errors produced when parsing a date span selector.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(display("unknown date span '{input}' (expected intersection|union)"))]
pub struct ParseDateSpanError {
    /// The original input string.
    pub input: String,
}

/// Resampling cadence for normalized date grids.
///
/// Grid points are calendar-aligned: days start at midnight, weeks on
/// Monday, months on the 1st, quarters on Jan/Apr/Jul/Oct 1st and years on
/// Jan 1st.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Frequency {
    /// One grid point per calendar day.
    Daily,
    /// One grid point per week, on Mondays.
    Weekly,
    /// One grid point per calendar month, on the 1st.
    Monthly,
    /// One grid point per calendar quarter.
    Quarterly,
    /// One grid point per calendar year, on Jan 1st.
    Yearly,
}

impl Frequency {
    /// All supported frequencies, finest first.
    pub const ALL: [Frequency; 5] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Yearly,
    ];

    /// Lowercase name used by [`fmt::Display`] and accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let spec = input.trim();
        ensure!(!spec.is_empty(), EmptyFrequencySnafu);

        match spec.to_ascii_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Frequency::Daily),
            "w" | "week" | "weekly" => Ok(Frequency::Weekly),
            "m" | "month" | "monthly" => Ok(Frequency::Monthly),
            "q" | "quarter" | "quarterly" => Ok(Frequency::Quarterly),
            "y" | "year" | "yearly" => Ok(Frequency::Yearly),
            _ => UnknownFrequencySnafu { input: spec }.fail(),
        }
    }
}

/// Selects how per-realization date sets are combined.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum DateSpan {
    /// Only dates present for every selected realization.
    #[default]
    Intersection,
    /// Dates present for any selected realization.
    Union,
}

impl fmt::Display for DateSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSpan::Intersection => f.write_str("intersection"),
            DateSpan::Union => f.write_str("union"),
        }
    }
}

impl FromStr for DateSpan {
    type Err = ParseDateSpanError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "intersection" => Ok(DateSpan::Intersection),
            "union" => Ok(DateSpan::Union),
            _ => ParseDateSpanSnafu {
                input: input.trim(),
            }
            .fail(),
        }
    }
}
