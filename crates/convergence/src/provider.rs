//! Provider variant contract
//!
//! A [`ProviderVariant`] is a named implementation of some resource type,
//! exposing the four capability facets the resolver dispatches on:
//! `implements`, `enabled`, `handles`, and `replaces`. Variants are data
//! records plus trait functions, registered once at startup; the registry
//! holds no per-call state.

use crate::error::ProbeError;
use crate::facts::HostFacts;
use crate::probe::SubsystemProbe;
use crate::resource::{Action, ResourceDeclaration, ResourceKind};
use crate::runner::CommandRunner;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Stable identifier of a provider variant.
///
/// Identifiers form the total order used to make tie-handling
/// reproducible, so they are plain strings compared lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProviderId(&'static str);

impl ProviderId {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Execution context handed to provider construction.
///
/// Everything a provider needs from its environment travels here
/// explicitly; there is no ambient shared state.
#[derive(Clone)]
pub struct RunContext {
    pub facts: Arc<HostFacts>,
    pub runner: Arc<dyn CommandRunner>,
}

impl RunContext {
    pub fn new(facts: Arc<HostFacts>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { facts, runner }
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("facts", &self.facts)
            .finish_non_exhaustive()
    }
}

/// A registered implementation candidate for some resource type
pub trait ProviderVariant: Send + Sync {
    /// Stable identifier, unique within the registry
    fn id(&self) -> ProviderId;

    /// Whether this variant implements the given resource type
    fn implements(&self, kind: ResourceKind) -> bool;

    /// Whether this variant can run on a host with these facts
    fn enabled(&self, facts: &HostFacts) -> bool;

    /// Whether this variant can handle this specific resource and action.
    ///
    /// This is where subsystem-probe-driven logic lives; the probe is
    /// consulted lazily, only by variants whose predicate needs it. A
    /// probe failure surfaces as an error, never as a silent "no".
    fn handles(
        &self,
        resource: &ResourceDeclaration,
        action: Action,
        probe: &dyn SubsystemProbe,
    ) -> Result<bool, ProbeError>;

    /// Variant identifiers this variant supersedes when both match
    fn replaces(&self) -> &[ProviderId] {
        &[]
    }

    /// Build the provider instance bound to this resource and action
    fn construct(
        &self,
        resource: &ResourceDeclaration,
        action: Action,
        ctx: &RunContext,
    ) -> Box<dyn Provider>;
}

/// A resolved provider instance, bound to one resource and action.
///
/// This is the interface the convergence engine drives; the converge
/// logic itself lives with each concrete provider, outside this crate.
pub trait Provider: fmt::Debug + Send + Sync {
    /// The variant this instance was constructed from
    fn variant(&self) -> ProviderId;

    /// The resource this instance will converge
    fn resource(&self) -> &ResourceDeclaration;

    /// The action this instance was bound to
    fn action(&self) -> Action;

    /// One-line human description of what converging would do
    fn describe(&self) -> String;
}
