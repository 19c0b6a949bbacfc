//! Static fallback table
//!
//! Default providers for the force-dynamic resource types, used only when
//! dynamic resolution found nothing. The service entry is keyed off host
//! OS facts alone - a deliberately coarse best-guess, good enough for
//! why-run and error reporting, never a substitute for real dynamic
//! resolution. An unrecognized kind reaching this table is a registration
//! bug and fails loudly.

use crate::error::ConfigurationError;
use crate::facts::HostFacts;
use crate::provider::ProviderId;
use crate::resource::ResourceKind;
use std::collections::BTreeMap;

/// How a fallback entry picks its provider
#[derive(Debug, Clone)]
enum FallbackRule {
    /// One provider regardless of host
    Fixed(ProviderId),
    /// Ordered (os, provider) pairs with a final default
    ByOs {
        entries: Vec<(String, ProviderId)>,
        default: ProviderId,
    },
}

/// Flat mapping from force-dynamic resource types to default providers
#[derive(Debug, Clone, Default)]
pub struct FallbackTable {
    rules: BTreeMap<ResourceKind, FallbackRule>,
}

impl FallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a kind to a single fixed provider
    pub fn fixed(mut self, kind: ResourceKind, id: ProviderId) -> Self {
        self.rules.insert(kind, FallbackRule::Fixed(id));
        self
    }

    /// Map a kind through host OS, with a default for everything else
    pub fn by_os<I, S>(mut self, kind: ResourceKind, entries: I, default: ProviderId) -> Self
    where
        I: IntoIterator<Item = (S, ProviderId)>,
        S: Into<String>,
    {
        self.rules.insert(
            kind,
            FallbackRule::ByOs {
                entries: entries
                    .into_iter()
                    .map(|(os, id)| (os.into(), id))
                    .collect(),
                default,
            },
        );
        self
    }

    /// Pick the default provider for a kind on this host.
    ///
    /// # Errors
    ///
    /// A kind without an entry is a `ConfigurationError`: only
    /// force-dynamic kinds may reach this table, and all of them must be
    /// covered at registration time.
    pub fn provider_for(
        &self,
        facts: &HostFacts,
        kind: ResourceKind,
    ) -> Result<ProviderId, ConfigurationError> {
        match self.rules.get(&kind) {
            Some(FallbackRule::Fixed(id)) => Ok(*id),
            Some(FallbackRule::ByOs { entries, default }) => Ok(entries
                .iter()
                .find(|(os, _)| *os == facts.os)
                .map_or(*default, |(_, id)| *id)),
            None => Err(ConfigurationError::MissingFallback { kind }),
        }
    }

    /// The kinds this table covers, in order
    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> {
        self.rules.keys().copied()
    }
}
