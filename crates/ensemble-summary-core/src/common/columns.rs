//! Reserved column names in a summary table.
//!
//! Every table handled by this crate has a `DATE` column (millisecond
//! timestamps) and, once realizations have been merged, a `REAL` column
//! holding the integer realization id. Ensemble-level dataframes may also
//! carry an `ENSEMBLE` column, which is never stored. All remaining columns
//! are summary vectors.

/// Name of the timestamp column.
pub const DATE_COLUMN: &str = "DATE";

/// Name of the realization id column.
pub const REAL_COLUMN: &str = "REAL";

/// Name of the ensemble label column accepted on ingest of combined frames.
pub const ENSEMBLE_COLUMN: &str = "ENSEMBLE";

/// Returns `true` for column names that are not summary vectors.
pub fn is_reserved_column(name: &str) -> bool {
    matches!(name, DATE_COLUMN | REAL_COLUMN | ENSEMBLE_COLUMN)
}
