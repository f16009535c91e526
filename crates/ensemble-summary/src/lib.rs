//! # ensemble-summary
//!
//! Write-once Parquet stores for ensemble summary time series, with
//! resampled and point-in-time vector queries.
//!
//! This crate is the supported public entry point and provides a small, stable surface.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ensemble_summary::prelude::*;
//!
//! let location = StoreLocation::local("/data/stores");
//! let provider = LazyResamplingProvider::from_backing_store(&location, "iter-0")?
//!     .expect("store written earlier");
//! let monthly = provider.get_vectors_df(
//!     &["FOPT", "FOPR"],
//!     Some(ResamplingOptions::new(Frequency::Monthly)),
//!     None,
//! )?;
//! ```

/// Convenience prelude with the stable, supported surface.
pub mod prelude;

/// Realization file discovery and parallel loading.
pub mod ingest {
    pub use ensemble_summary_core::discovery::{DiscoveryError, discover_realization_files};
    pub use ensemble_summary_core::ingest::{IngestError, load_per_realization_tables};
}

pub use ensemble_summary_core::common::columns::{DATE_COLUMN, ENSEMBLE_COLUMN, REAL_COLUMN};
pub use ensemble_summary_core::common::frequency::{
    DateSpan, Frequency, ParseDateSpanError, ParseFrequencyError,
};
pub use ensemble_summary_core::metadata::VectorMetadata;
pub use ensemble_summary_core::provider::{
    EnsembleSummaryProvider, LazyResamplingProvider, PresampledProvider, ProviderError,
    ResamplingOptions,
};
pub use ensemble_summary_core::provider_set::{EnsembleSummaryProviderSet, ProviderSetError};
pub use ensemble_summary_core::storage::StoreLocation;
pub use ensemble_summary_core::store::BackingStoreError;
