//! Resampling engine.
//!
//! Re-expresses irregular per-realization series on calendar-aligned date
//! grids:
//!
//! - [`grid`]: normalized sample dates for a [`Frequency`](crate::common::frequency::Frequency).
//! - [`interpolate`]: backfill (rates) and linear (everything else) interpolation.
//! - [`resample`]: whole-table resampling, per realization or onto a shared grid.
//! - [`point_sample`]: values of every realization at a single query date.
//!
//! Every function here expects multi-realization input to be segmented by
//! `REAL` with dates strictly increasing inside each segment, which is how
//! backing stores lay out their rows.

pub mod grid;
pub mod interpolate;
pub mod point_sample;
pub mod resample;

pub use grid::{
    calc_intersection_of_normalized_date_intervals, find_intersection_of_normalized_dates,
    find_union_of_normalized_dates, generate_normalized_sample_dates,
    get_normalized_min_max_sample_date,
};
pub use interpolate::{interpolate_backfill, interpolate_linear};
pub use point_sample::sample_segmented_multi_real_table_at_date;
pub use resample::{resample_segmented_multi_real_table, resample_single_real_table};
