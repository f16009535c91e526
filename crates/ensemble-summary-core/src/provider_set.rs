//! Named providers, one per ensemble.
//!
//! Insertion order is significant: [`EnsembleSummaryProviderSet::vector_metadata`]
//! returns the metadata of the first provider that has it, so two sets
//! holding the same providers in different orders can disagree when the
//! ensembles disagree. Use
//! [`EnsembleSummaryProviderSet::verify_consistent_vector_metadata`] to
//! detect that situation.
use std::collections::BTreeSet;
use std::sync::Arc;

use snafu::prelude::*;

use crate::metadata::VectorMetadata;
use crate::provider::EnsembleSummaryProvider;

/// Errors from provider set lookups and checks.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProviderSetError {
    /// No provider is registered under the requested name.
    #[snafu(display("No provider named {name}"))]
    ProviderNotFound {
        /// The requested name.
        name: String,
    },

    /// Two providers carry different metadata for the same vector.
    #[snafu(display(
        "Inconsistent metadata for vector {vector}: providers {first_provider} and {second_provider} disagree"
    ))]
    InconsistentVectorMetadata {
        /// Vector whose metadata differs.
        vector: String,
        /// Earlier provider in insertion order.
        first_provider: String,
        /// Later provider that disagrees with it.
        second_provider: String,
    },
}

/// Providers keyed by name, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct EnsembleSummaryProviderSet {
    providers: Vec<(String, Arc<dyn EnsembleSummaryProvider>)>,
}

impl EnsembleSummaryProviderSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under `name`.
    ///
    /// Re-registering a name replaces the provider but keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, provider: Arc<dyn EnsembleSummaryProvider>) {
        let name = name.into();
        match self.providers.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = provider,
            None => self.providers.push((name, provider)),
        }
    }

    /// Look up a provider by name.
    pub fn provider(
        &self,
        name: &str,
    ) -> Result<&Arc<dyn EnsembleSummaryProvider>, ProviderSetError> {
        self.providers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
            .context(ProviderNotFoundSnafu { name })
    }

    /// All providers, in insertion order.
    pub fn all_providers(&self) -> Vec<&Arc<dyn EnsembleSummaryProvider>> {
        self.providers.iter().map(|(_, p)| p).collect()
    }

    /// All provider names, in insertion order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// `true` if no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Sorted union of every provider's vector names.
    pub fn all_vector_names(&self) -> Vec<String> {
        let names: BTreeSet<String> = self
            .providers
            .iter()
            .flat_map(|(_, p)| p.vector_names())
            .collect();
        names.into_iter().collect()
    }

    /// Sorted union of every provider's realizations.
    pub fn all_realizations(&self) -> Vec<i64> {
        let reals: BTreeSet<i64> = self
            .providers
            .iter()
            .flat_map(|(_, p)| p.realizations())
            .collect();
        reals.into_iter().collect()
    }

    /// Metadata for `vector_name` from the first provider, in insertion
    /// order, that has the vector and metadata for it.
    pub fn vector_metadata(&self, vector_name: &str) -> Option<VectorMetadata> {
        self.providers
            .iter()
            .filter(|(_, p)| p.vector_names().iter().any(|v| v == vector_name))
            .find_map(|(_, p)| p.vector_metadata(vector_name))
    }

    /// Check that every provider holding a vector agrees on its metadata.
    ///
    /// Absent metadata counts as a value: a provider without metadata for a
    /// vector disagrees with one that has it. Reports the first mismatch.
    pub fn verify_consistent_vector_metadata(&self) -> Result<(), ProviderSetError> {
        for vector in self.all_vector_names() {
            let mut first: Option<(&str, Option<VectorMetadata>)> = None;
            for (name, provider) in &self.providers {
                if !provider.vector_names().contains(&vector) {
                    continue;
                }
                let metadata = provider.vector_metadata(&vector);
                if let Some((first_name, first_metadata)) = &first {
                    ensure!(
                        *first_metadata == metadata,
                        InconsistentVectorMetadataSnafu {
                            vector: vector.as_str(),
                            first_provider: *first_name,
                            second_provider: name.as_str(),
                        }
                    );
                } else {
                    first = Some((name.as_str(), metadata));
                }
            }
        }
        Ok(())
    }
}
