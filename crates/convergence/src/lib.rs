//! # Convergence
//!
//! Provider resolution for declarative host convergence.
//!
//! Given a declared resource ("service ntp should be started") and a
//! snapshot of host facts, this crate decides which single concrete
//! implementation - the provider - is responsible for converging it.
//!
//! ## Core Concepts
//!
//! - **ResourceDeclaration**: what the caller wants managed, plus the
//!   requested [`Action`]
//! - **HostFacts**: immutable platform identity (os, platform, family,
//!   version, open-ended attributes)
//! - **ProviderVariant**: a named implementation candidate exposing four
//!   capability facets: implements / enabled / handles / replaces
//! - **ProviderRegistry**: the closed set of variants, assembled once at
//!   startup, enumerated in stable lexicographic id order
//! - **SubsystemProbe**: live host inspection (installed service
//!   frameworks, per-service configuration artifacts) consulted lazily
//!   by `handles` predicates
//! - **ProviderResolver**: reconciles explicit overrides, dynamic
//!   capability discovery, and the static tables into exactly one
//!   provider instance - or a structured failure
//!
//! ## Resolution order
//!
//! 1. An explicit override on the declaration wins outright; no
//!    predicate and no probe runs.
//! 2. Dynamic discovery filters registered variants by enablement and
//!    their `handles` predicates, then applies the one-level `replaces`
//!    relation. Exactly one survivor resolves; two or more is an
//!    [`error::ResolveError::Ambiguous`] failure, never a silent pick.
//! 3. Force-dynamic kinds (service, file) fall back to the
//!    [`FallbackTable`]; everything else consults the [`PlatformTable`].
//!
//! ## Example
//!
//! ```ignore
//! use convergence::{
//!     Action, FallbackTable, HostFacts, HostProbe, PlatformTable,
//!     ProviderRegistry, ProviderResolver, ResourceDeclaration,
//!     ResourceKind, SystemRunner,
//! };
//! use std::sync::Arc;
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register(Box::new(my_catalog::InitVariant))?;
//!
//! let runner = Arc::new(SystemRunner::new());
//! let resolver = ProviderResolver::new(
//!     Arc::new(registry),
//!     FallbackTable::new(),
//!     PlatformTable::new(),
//!     Arc::new(HostFacts::detect()),
//!     Arc::new(HostProbe::new(runner.clone())),
//!     runner,
//! );
//!
//! let resource = ResourceDeclaration::new(ResourceKind::Service, "ntp");
//! let provider = resolver.resolve(&resource, Action::Start)?;
//! println!("{}", provider.describe());
//! ```

pub mod error;
pub mod facts;
pub mod fallback;
pub mod platform_table;
pub mod probe;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod resource;
pub mod runner;

// Re-export main types at crate root
pub use error::{ConfigurationError, ProbeError, ResolveError};
pub use facts::HostFacts;
pub use fallback::FallbackTable;
pub use platform_table::{FamilyRules, PlatformTable, PlatformVersion, VersionRule};
pub use probe::{HostProbe, ServiceConfig, Subsystem, SubsystemProbe};
pub use provider::{Provider, ProviderId, ProviderVariant, RunContext};
pub use registry::ProviderRegistry;
pub use resolver::ProviderResolver;
pub use resource::{Action, ResourceDeclaration, ResourceKind, ResourceRef};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
