//! Provider resolution
//!
//! Turns (resource declaration, action, host facts, live subsystem facts)
//! into exactly one provider instance. Three strategies are reconciled in
//! strict order: explicit user override, dynamic capability discovery,
//! and the static tables. Ties are surfaced as errors, never broken by
//! picking the first match.

use crate::error::{ConfigurationError, ResolveError, Result};
use crate::facts::HostFacts;
use crate::fallback::FallbackTable;
use crate::platform_table::PlatformTable;
use crate::probe::SubsystemProbe;
use crate::provider::{Provider, ProviderId, ProviderVariant, RunContext};
use crate::registry::ProviderRegistry;
use crate::resource::{Action, ResourceDeclaration, ResourceKind, ResourceRef};
use crate::runner::CommandRunner;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Resource types whose correct implementation is too platform-variable
/// to hardcode: they never consult the legacy platform table.
const FORCE_DYNAMIC: [ResourceKind; 2] = [ResourceKind::Service, ResourceKind::File];

/// The resolution engine.
///
/// Holds only immutable state (registry, tables, facts) plus the probe,
/// so concurrent resolve calls need no locking. Subsystem facts are
/// recomputed per call through the probe; nothing is cached here.
pub struct ProviderResolver {
    registry: Arc<ProviderRegistry>,
    fallback: FallbackTable,
    platform: PlatformTable,
    facts: Arc<HostFacts>,
    probe: Arc<dyn SubsystemProbe>,
    ctx: RunContext,
}

impl ProviderResolver {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        fallback: FallbackTable,
        platform: PlatformTable,
        facts: Arc<HostFacts>,
        probe: Arc<dyn SubsystemProbe>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let ctx = RunContext::new(facts.clone(), runner);
        Self {
            registry,
            fallback,
            platform,
            facts,
            probe,
            ctx,
        }
    }

    /// Resolve a declaration to the single provider instance responsible
    /// for converging it.
    ///
    /// # Errors
    ///
    /// Fails with [`ResolveError::Ambiguous`] when two or more dynamic
    /// candidates tie, [`ResolveError::NoProvider`] when every stage is
    /// exhausted, [`ResolveError::Probe`] when a capability predicate
    /// could not be evaluated, and [`ResolveError::Configuration`] on a
    /// registry/table inconsistency.
    pub fn resolve(
        &self,
        resource: &ResourceDeclaration,
        action: Action,
    ) -> Result<Box<dyn Provider>> {
        // The caller has overridden resolution; no facts are consulted.
        if let Some(id) = resource.provider {
            return self.explicit(resource, action, id);
        }

        if let Some(provider) = self.dynamic(resource, action)? {
            return Ok(provider);
        }

        if FORCE_DYNAMIC.contains(&resource.kind) {
            let id = self.fallback.provider_for(&self.facts, resource.kind)?;
            log::debug!("static fallback for {} selected {id}", resource.kind);
            self.construct(id, resource, action)
        } else {
            match self.platform.lookup(&self.facts, resource.kind) {
                Some(id) => {
                    log::debug!("platform table for {} selected {id}", resource.kind);
                    self.construct(id, resource, action)
                }
                None => Err(ResolveError::NoProvider {
                    resource: ResourceRef::new(resource, action),
                }),
            }
        }
    }

    fn explicit(
        &self,
        resource: &ResourceDeclaration,
        action: Action,
        id: ProviderId,
    ) -> Result<Box<dyn Provider>> {
        match self.registry.get(id) {
            Some(variant) => Ok(variant.construct(resource, action, &self.ctx)),
            None => Err(ResolveError::NoProvider {
                resource: ResourceRef::new(resource, action),
            }),
        }
    }

    /// Dynamic capability discovery: filter by enablement, then by the
    /// handles predicate, then apply the replaces relation. Returns
    /// `None` when zero candidates survive so the caller can fall back.
    fn dynamic(
        &self,
        resource: &ResourceDeclaration,
        action: Action,
    ) -> Result<Option<Box<dyn Provider>>> {
        let enabled: Vec<&dyn ProviderVariant> = self
            .registry
            .variants()
            .filter(|variant| {
                variant.enabled(&self.facts) && variant.implements(resource.kind)
            })
            .collect();
        log::debug!(
            "variants enabled for generic {} on this host: {:?}",
            resource.kind,
            ids(&enabled)
        );

        let mut survivors = Vec::with_capacity(enabled.len());
        for variant in enabled {
            // Probes run lazily inside each predicate; a variant that
            // does not probe is unaffected by a broken probe.
            if variant.handles(resource, action, self.probe.as_ref())? {
                survivors.push(variant);
            }
        }
        log::debug!(
            "variants that can handle {}: {:?}",
            ResourceRef::new(resource, action),
            ids(&survivors)
        );

        // Gather every survivor's replaces set, then drop the replaced in
        // a single pass. One level only - deliberately not a transitive
        // closure.
        let replaced: BTreeSet<ProviderId> = survivors
            .iter()
            .flat_map(|variant| variant.replaces().iter().copied())
            .collect();
        survivors.retain(|variant| !replaced.contains(&variant.id()));
        log::debug!("variants that survived replacement: {:?}", ids(&survivors));

        match survivors.as_slice() {
            [] => Ok(None),
            [variant] => Ok(Some(variant.construct(resource, action, &self.ctx))),
            tied => Err(ResolveError::Ambiguous {
                resource: ResourceRef::new(resource, action),
                candidates: tied.iter().map(|variant| variant.id()).collect(),
            }),
        }
    }

    fn construct(
        &self,
        id: ProviderId,
        resource: &ResourceDeclaration,
        action: Action,
    ) -> Result<Box<dyn Provider>> {
        let variant = self
            .registry
            .get(id)
            .ok_or(ConfigurationError::Unregistered { id })?;
        Ok(variant.construct(resource, action, &self.ctx))
    }
}

fn ids(variants: &[&dyn ProviderVariant]) -> Vec<&'static str> {
    variants.iter().map(|variant| variant.id().as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    // Shadow the glob-imported `error::Result` alias so the trait-impl
    // signatures below resolve to the two-parameter `std::result::Result`.
    use std::result::Result;
    use crate::probe::{ServiceConfig, Subsystem};
    use crate::runner::CommandOutput;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Configurable variant double
    struct TestVariant {
        id: &'static str,
        kind: ResourceKind,
        enabled: bool,
        handles: bool,
        /// consult the probe before answering, to exercise laziness
        probes: bool,
        replaces: &'static [ProviderId],
    }

    impl TestVariant {
        fn service(id: &'static str) -> Self {
            Self {
                id,
                kind: ResourceKind::Service,
                enabled: true,
                handles: true,
                probes: false,
                replaces: &[],
            }
        }

        fn disabled(mut self) -> Self {
            self.enabled = false;
            self
        }

        fn rejects(mut self) -> Self {
            self.handles = false;
            self
        }

        fn probing(mut self) -> Self {
            self.probes = true;
            self
        }

        fn replacing(mut self, ids: &'static [ProviderId]) -> Self {
            self.replaces = ids;
            self
        }

        fn for_kind(mut self, kind: ResourceKind) -> Self {
            self.kind = kind;
            self
        }
    }

    impl ProviderVariant for TestVariant {
        fn id(&self) -> ProviderId {
            ProviderId::new(self.id)
        }

        fn implements(&self, kind: ResourceKind) -> bool {
            kind == self.kind
        }

        fn enabled(&self, _facts: &HostFacts) -> bool {
            self.enabled
        }

        fn handles(
            &self,
            _resource: &ResourceDeclaration,
            _action: Action,
            probe: &dyn SubsystemProbe,
        ) -> Result<bool, ProbeError> {
            if self.probes {
                probe.installed_subsystems()?;
            }
            Ok(self.handles)
        }

        fn replaces(&self) -> &[ProviderId] {
            self.replaces
        }

        fn construct(
            &self,
            resource: &ResourceDeclaration,
            action: Action,
            _ctx: &RunContext,
        ) -> Box<dyn Provider> {
            Box::new(TestProvider {
                variant: self.id(),
                resource: resource.clone(),
                action,
            })
        }
    }

    #[derive(Debug)]
    struct TestProvider {
        variant: ProviderId,
        resource: ResourceDeclaration,
        action: Action,
    }

    impl Provider for TestProvider {
        fn variant(&self) -> ProviderId {
            self.variant
        }

        fn resource(&self) -> &ResourceDeclaration {
            &self.resource
        }

        fn action(&self) -> Action {
            self.action
        }

        fn describe(&self) -> String {
            format!("{} {}", self.action, self.resource.name)
        }
    }

    /// Probe double counting every consultation
    struct CountingProbe {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingProbe {
        fn quiet() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn broken() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn record(&self) -> Result<(), ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProbeError::CommandFailed {
                    command: "systemctl --all".to_string(),
                    status: 1,
                    stderr: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    impl SubsystemProbe for CountingProbe {
        fn installed_subsystems(&self) -> Result<Vec<Subsystem>, ProbeError> {
            self.record()?;
            Ok(Vec::new())
        }

        fn configured_subsystems(
            &self,
            _service_name: &str,
        ) -> Result<Vec<ServiceConfig>, ProbeError> {
            self.record()?;
            Ok(Vec::new())
        }
    }

    struct NoopRunner;

    impl CommandRunner for NoopRunner {
        fn run(&self, _command: &str, _args: &[&str]) -> Result<CommandOutput, ProbeError> {
            Ok(CommandOutput {
                status: Some(0),
                stdout: Vec::new(),
                stderr: Vec::new(),
            })
        }
    }

    const ID_A: ProviderId = ProviderId::new("service.a");
    const ID_B: ProviderId = ProviderId::new("service.b");
    const ID_C: ProviderId = ProviderId::new("service.c");
    const FILE_DEFAULT: ProviderId = ProviderId::new("file.default");
    const PKG_APT: ProviderId = ProviderId::new("package.apt");

    fn facts() -> Arc<HostFacts> {
        Arc::new(HostFacts::new("linux", "ubuntu", "debian", "14.04"))
    }

    struct Setup {
        variants: Vec<TestVariant>,
        fallback: FallbackTable,
        platform: PlatformTable,
        probe: Arc<CountingProbe>,
    }

    impl Setup {
        fn new(variants: Vec<TestVariant>) -> Self {
            Self {
                variants,
                fallback: FallbackTable::new(),
                platform: PlatformTable::new(),
                probe: Arc::new(CountingProbe::quiet()),
            }
        }

        fn fallback(mut self, table: FallbackTable) -> Self {
            self.fallback = table;
            self
        }

        fn platform(mut self, table: PlatformTable) -> Self {
            self.platform = table;
            self
        }

        fn probe(mut self, probe: CountingProbe) -> Self {
            self.probe = Arc::new(probe);
            self
        }

        fn resolver(self) -> (ProviderResolver, Arc<CountingProbe>) {
            let mut registry = ProviderRegistry::new();
            for variant in self.variants {
                registry.register(Box::new(variant)).expect("register");
            }
            let probe = self.probe.clone();
            let resolver = ProviderResolver::new(
                Arc::new(registry),
                self.fallback,
                self.platform,
                facts(),
                self.probe,
                Arc::new(NoopRunner),
            );
            (resolver, probe)
        }
    }

    fn service_ntp() -> ResourceDeclaration {
        ResourceDeclaration::new(ResourceKind::Service, "ntp")
    }

    #[test]
    fn test_explicit_override_skips_predicates_and_probe() {
        let (resolver, probe) = Setup::new(vec![
            // would fail the probe if any predicate ran
            TestVariant::service("service.a").probing(),
            TestVariant::service("service.b"),
        ])
        .probe(CountingProbe::broken())
        .resolver();

        let resource = service_ntp().with_provider(ID_B);
        let provider = resolver.resolve(&resource, Action::Start).expect("resolve");
        assert_eq!(provider.variant(), ID_B);
        assert_eq!(probe.call_count(), 0);
    }

    #[test]
    fn test_explicit_override_of_unknown_id_fails_with_detail() {
        let (resolver, _) = Setup::new(vec![TestVariant::service("service.a")]).resolver();

        let resource = service_ntp().with_provider(ProviderId::new("service.nope"));
        let err = resolver.resolve(&resource, Action::Start).unwrap_err();
        match err {
            ResolveError::NoProvider { resource } => {
                assert_eq!(resource.provider, Some(ProviderId::new("service.nope")));
            }
            other => panic!("expected NoProvider, got {other:?}"),
        }
    }

    #[test]
    fn test_single_survivor_wins() {
        let (resolver, _) = Setup::new(vec![
            TestVariant::service("service.a"),
            TestVariant::service("service.b").rejects(),
            TestVariant::service("service.c").disabled(),
        ])
        .resolver();

        let provider = resolver.resolve(&service_ntp(), Action::Start).expect("resolve");
        assert_eq!(provider.variant(), ID_A);
        assert_eq!(provider.action(), Action::Start);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        for _ in 0..3 {
            let (resolver, _) = Setup::new(vec![
                TestVariant::service("service.b"),
                TestVariant::service("service.a").replacing(&[ID_B]),
            ])
            .resolver();
            let provider = resolver.resolve(&service_ntp(), Action::Start).expect("resolve");
            assert_eq!(provider.variant(), ID_A);
        }
    }

    #[test]
    fn test_two_survivors_without_replaces_is_ambiguous() {
        let (resolver, _) = Setup::new(vec![
            TestVariant::service("service.a"),
            TestVariant::service("service.b"),
        ])
        .resolver();

        let err = resolver.resolve(&service_ntp(), Action::Start).unwrap_err();
        match err {
            ResolveError::Ambiguous { candidates, .. } => {
                assert_eq!(candidates, vec![ID_A, ID_B]);
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_replaced_variant_is_never_returned() {
        let (resolver, _) = Setup::new(vec![
            TestVariant::service("service.a").replacing(&[ID_B]),
            TestVariant::service("service.b"),
        ])
        .resolver();

        let provider = resolver.resolve(&service_ntp(), Action::Start).expect("resolve");
        assert_eq!(provider.variant(), ID_A);
    }

    #[test]
    fn test_replaces_union_includes_sets_of_replaced_survivors() {
        // a replaces b, b replaces c: all three survive filtering, and the
        // union of every survivor's set removes both b and c.
        let (resolver, _) = Setup::new(vec![
            TestVariant::service("service.a").replacing(&[ID_B]),
            TestVariant::service("service.b").replacing(&[ID_C]),
            TestVariant::service("service.c"),
        ])
        .resolver();

        let provider = resolver.resolve(&service_ntp(), Action::Start).expect("resolve");
        assert_eq!(provider.variant(), ID_A);
    }

    #[test]
    fn test_replaces_is_one_level_not_transitive() {
        // a replaces b only; b (which replaces c) did not survive
        // filtering, so nothing removes c: a and c tie. Pins the
        // deliberate absence of a transitive closure.
        let (resolver, _) = Setup::new(vec![
            TestVariant::service("service.a").replacing(&[ID_B]),
            TestVariant::service("service.b").rejects().replacing(&[ID_C]),
            TestVariant::service("service.c"),
        ])
        .resolver();

        let err = resolver.resolve(&service_ntp(), Action::Start).unwrap_err();
        match err {
            ResolveError::Ambiguous { candidates, .. } => {
                assert_eq!(candidates, vec![ID_A, ID_C]);
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_force_dynamic_kind_uses_fallback_table_not_platform_table() {
        // platform table deliberately disagrees; it must not be consulted
        let (resolver, _) = Setup::new(vec![
            TestVariant::service("file.disabled")
                .for_kind(ResourceKind::File)
                .disabled(),
        ])
        .fallback(FallbackTable::new().fixed(ResourceKind::File, ProviderId::new("file.disabled")))
        .platform(
            PlatformTable::new().default_provider(ResourceKind::File, ProviderId::new("file.wrong")),
        )
        .resolver();

        let resource = ResourceDeclaration::new(ResourceKind::File, "/etc/motd");
        let provider = resolver.resolve(&resource, Action::Create).expect("resolve");
        assert_eq!(provider.variant(), ProviderId::new("file.disabled"));
    }

    #[test]
    fn test_missing_fallback_entry_is_a_configuration_error() {
        let (resolver, _) = Setup::new(vec![]).resolver();

        let resource = ResourceDeclaration::new(ResourceKind::File, "/etc/motd");
        let err = resolver.resolve(&resource, Action::Create).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Configuration(ConfigurationError::MissingFallback { .. })
        ));
    }

    #[test]
    fn test_non_force_dynamic_kind_uses_platform_table() {
        let (resolver, _) = Setup::new(vec![
            TestVariant::service("package.apt")
                .for_kind(ResourceKind::Package)
                .rejects(),
        ])
        .platform(PlatformTable::new().family(
            "debian",
            crate::platform_table::FamilyRules::new().provider(ResourceKind::Package, PKG_APT),
        ))
        .resolver();

        let resource = ResourceDeclaration::new(ResourceKind::Package, "ntp");
        let provider = resolver.resolve(&resource, Action::Install).expect("resolve");
        assert_eq!(provider.variant(), PKG_APT);
    }

    #[test]
    fn test_platform_table_miss_is_no_provider() {
        let (resolver, _) = Setup::new(vec![]).resolver();

        let resource = ResourceDeclaration::new(ResourceKind::Package, "ntp");
        let err = resolver.resolve(&resource, Action::Install).unwrap_err();
        match err {
            ResolveError::NoProvider { resource } => {
                assert_eq!(resource.kind, ResourceKind::Package);
                assert_eq!(resource.name, "ntp");
            }
            other => panic!("expected NoProvider, got {other:?}"),
        }
    }

    #[test]
    fn test_table_id_missing_from_registry_is_a_configuration_error() {
        let (resolver, _) = Setup::new(vec![])
            .fallback(FallbackTable::new().fixed(ResourceKind::File, FILE_DEFAULT))
            .resolver();

        let resource = ResourceDeclaration::new(ResourceKind::File, "/etc/motd");
        let err = resolver.resolve(&resource, Action::Create).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Configuration(ConfigurationError::Unregistered { id: FILE_DEFAULT })
        ));
    }

    #[test]
    fn test_probe_failure_inside_handles_aborts_the_call() {
        let (resolver, _) = Setup::new(vec![TestVariant::service("service.a").probing()])
            .probe(CountingProbe::broken())
            .resolver();

        let err = resolver.resolve(&service_ntp(), Action::Start).unwrap_err();
        assert!(matches!(err, ResolveError::Probe(_)));
    }

    #[test]
    fn test_variant_without_probe_dependency_unaffected_by_broken_probe() {
        let (resolver, probe) = Setup::new(vec![TestVariant::service("service.a")])
            .probe(CountingProbe::broken())
            .resolver();

        let provider = resolver.resolve(&service_ntp(), Action::Start).expect("resolve");
        assert_eq!(provider.variant(), ID_A);
        assert_eq!(probe.call_count(), 0);
    }

    #[test]
    fn test_resolve_does_not_mutate_the_declaration() {
        let (resolver, _) = Setup::new(vec![TestVariant::service("service.a")]).resolver();

        let resource = service_ntp();
        let before = resource.clone();
        let _ = resolver.resolve(&resource, Action::Start).expect("resolve");
        assert_eq!(resource, before);
    }
}
