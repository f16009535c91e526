//! Shared vocabulary used across the table, resampling and provider layers.
//!
//! - [`columns`]: the reserved column names every summary table uses.
//! - [`frequency`]: the resampling cadence ([`frequency::Frequency`]) and the
//!   multi-realization date span selector ([`frequency::DateSpan`]).

pub mod columns;
pub mod frequency;
