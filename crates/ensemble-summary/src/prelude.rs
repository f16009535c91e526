//! Wrapper prelude.
//!
//! The `ensemble-summary` crate is the supported public entry point.
//! Downstream code should prefer importing from this prelude instead of
//! depending on internal core module paths.

pub use crate::ingest;
pub use crate::{
    BackingStoreError, DateSpan, EnsembleSummaryProvider, EnsembleSummaryProviderSet, Frequency,
    LazyResamplingProvider, PresampledProvider, ProviderError, ProviderSetError,
    ResamplingOptions, StoreLocation, VectorMetadata,
};
