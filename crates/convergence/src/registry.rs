//! Provider variant registry
//!
//! A closed enumeration of every known provider variant, assembled during
//! a defined startup phase and immutable at resolve time. The internal
//! store is a `BTreeMap`, so enumeration order is the lexicographic id
//! order regardless of registration order - tie handling stays
//! reproducible run-to-run and host-to-host.

use crate::error::ConfigurationError;
use crate::provider::{ProviderId, ProviderVariant};
use std::collections::BTreeMap;

/// The set of registered provider variants
#[derive(Default)]
pub struct ProviderRegistry {
    variants: BTreeMap<ProviderId, Box<dyn ProviderVariant>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variant during startup.
    ///
    /// # Errors
    ///
    /// Rejects a second registration under an id already taken.
    pub fn register(&mut self, variant: Box<dyn ProviderVariant>) -> Result<(), ConfigurationError> {
        let id = variant.id();
        if self.variants.contains_key(&id) {
            return Err(ConfigurationError::Duplicate { id });
        }
        self.variants.insert(id, variant);
        Ok(())
    }

    /// Look a variant up by id
    pub fn get(&self, id: ProviderId) -> Option<&dyn ProviderVariant> {
        self.variants.get(&id).map(Box::as_ref)
    }

    /// Resolve a runtime string to a registered id
    pub fn find(&self, name: &str) -> Option<ProviderId> {
        self.variants
            .keys()
            .find(|id| id.as_str() == name)
            .copied()
    }

    /// All variants in lexicographic id order
    pub fn variants(&self) -> impl Iterator<Item = &dyn ProviderVariant> {
        self.variants.values().map(Box::as_ref)
    }

    /// All registered ids in lexicographic order
    pub fn ids(&self) -> impl Iterator<Item = ProviderId> {
        self.variants.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
