//! Legacy platform lookup table
//!
//! The final fallback for resource types that are not force-dynamic: a
//! nested mapping keyed by platform family, with ordered version-range
//! overrides ahead of each family default and a global default family.
//! The table is data - new platform entries are rows, not code changes.

use crate::facts::HostFacts;
use crate::provider::ProviderId;
use crate::resource::ResourceKind;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A platform version ordered by numeric components.
///
/// "10.0" must sort after "6.0", so components compare numerically, never
/// as strings. A non-numeric tail ("10.0-RELEASE") is tolerated; parsing
/// stops at the first component without a leading digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformVersion(Vec<u64>);

impl PlatformVersion {
    pub fn parse(version: &str) -> Self {
        let mut components = Vec::new();
        for segment in version.split('.') {
            let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
            let Ok(component) = digits.parse::<u64>() else {
                break;
            };
            components.push(component);
        }
        Self(components)
    }
}

impl Ord for PlatformVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let left = self.0.get(i).copied().unwrap_or(0);
            let right = other.0.get(i).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for PlatformVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A version-range condition attached to a table override
#[derive(Debug, Clone)]
pub struct VersionRule {
    op: CompareOp,
    version: PlatformVersion,
}

#[derive(Debug, Clone, Copy)]
enum CompareOp {
    AtLeast,
    Above,
    AtMost,
    Below,
    Exactly,
}

impl VersionRule {
    pub fn at_least(version: &str) -> Self {
        Self::new(CompareOp::AtLeast, version)
    }

    pub fn above(version: &str) -> Self {
        Self::new(CompareOp::Above, version)
    }

    pub fn at_most(version: &str) -> Self {
        Self::new(CompareOp::AtMost, version)
    }

    pub fn below(version: &str) -> Self {
        Self::new(CompareOp::Below, version)
    }

    pub fn exactly(version: &str) -> Self {
        Self::new(CompareOp::Exactly, version)
    }

    fn new(op: CompareOp, version: &str) -> Self {
        Self {
            op,
            version: PlatformVersion::parse(version),
        }
    }

    pub fn matches(&self, version: &PlatformVersion) -> bool {
        match self.op {
            CompareOp::AtLeast => *version >= self.version,
            CompareOp::Above => *version > self.version,
            CompareOp::AtMost => *version <= self.version,
            CompareOp::Below => *version < self.version,
            CompareOp::Exactly => *version == self.version,
        }
    }
}

/// Per-family rules: version overrides checked in order, then the default
#[derive(Debug, Clone, Default)]
pub struct FamilyRules {
    defaults: BTreeMap<ResourceKind, ProviderId>,
    overrides: Vec<(VersionRule, ResourceKind, ProviderId)>,
}

impl FamilyRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the family default for a resource kind
    pub fn provider(mut self, kind: ResourceKind, id: ProviderId) -> Self {
        self.defaults.insert(kind, id);
        self
    }

    /// Add a version-gated override, evaluated before the defaults.
    /// The first matching override wins, so list the most specific first.
    pub fn when(mut self, rule: VersionRule, kind: ResourceKind, id: ProviderId) -> Self {
        self.overrides.push((rule, kind, id));
        self
    }

    fn lookup(&self, version: &PlatformVersion, kind: ResourceKind) -> Option<ProviderId> {
        for (rule, rule_kind, id) in &self.overrides {
            if *rule_kind == kind && rule.matches(version) {
                return Some(*id);
            }
        }
        self.defaults.get(&kind).copied()
    }
}

/// The nested platform-family table
#[derive(Debug, Clone, Default)]
pub struct PlatformTable {
    families: BTreeMap<String, FamilyRules>,
    default_family: BTreeMap<ResourceKind, ProviderId>,
}

impl PlatformTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn family(mut self, name: impl Into<String>, rules: FamilyRules) -> Self {
        self.families.insert(name.into(), rules);
        self
    }

    /// Default used when the host's family has no entry for the kind
    pub fn default_provider(mut self, kind: ResourceKind, id: ProviderId) -> Self {
        self.default_family.insert(kind, id);
        self
    }

    /// Look up the provider for a kind on a host, or `None` for a miss
    pub fn lookup(&self, facts: &HostFacts, kind: ResourceKind) -> Option<ProviderId> {
        if let Some(rules) = self.families.get(&facts.platform_family) {
            let version = PlatformVersion::parse(&facts.platform_version);
            if let Some(id) = rules.lookup(&version, kind) {
                return Some(id);
            }
        }
        self.default_family.get(&kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBIAN: ProviderId = ProviderId::new("service.debian");
    const INSSERV: ProviderId = ProviderId::new("service.insserv");
    const INIT: ProviderId = ProviderId::new("service.init");
    const APT: ProviderId = ProviderId::new("package.apt");

    fn debian_facts(version: &str) -> HostFacts {
        HostFacts::new("linux", "debian", "debian", version)
    }

    fn table() -> PlatformTable {
        PlatformTable::new()
            .family(
                "debian",
                FamilyRules::new()
                    .provider(ResourceKind::Service, DEBIAN)
                    .provider(ResourceKind::Package, APT)
                    .when(VersionRule::at_least("6.0"), ResourceKind::Service, INSSERV),
            )
            .default_provider(ResourceKind::Service, INIT)
    }

    #[test]
    fn test_version_comparison_is_numeric_not_lexicographic() {
        let ten = PlatformVersion::parse("10.0");
        let six = PlatformVersion::parse("6.0");
        assert!(ten > six, "10.0 must sort after 6.0");
    }

    #[test]
    fn test_version_parse_tolerates_release_suffix() {
        assert_eq!(
            PlatformVersion::parse("10.0-RELEASE"),
            PlatformVersion::parse("10.0")
        );
    }

    #[test]
    fn test_version_missing_components_compare_as_zero() {
        assert_eq!(PlatformVersion::parse("6"), PlatformVersion::parse("6.0"));
        assert!(PlatformVersion::parse("6.1") > PlatformVersion::parse("6"));
    }

    #[test]
    fn test_override_applies_at_and_above_threshold() {
        let table = table();
        assert_eq!(
            table.lookup(&debian_facts("7.0"), ResourceKind::Service),
            Some(INSSERV)
        );
        assert_eq!(
            table.lookup(&debian_facts("6.0"), ResourceKind::Service),
            Some(INSSERV)
        );
    }

    #[test]
    fn test_family_default_below_threshold() {
        let table = table();
        assert_eq!(
            table.lookup(&debian_facts("4.0"), ResourceKind::Service),
            Some(DEBIAN)
        );
    }

    #[test]
    fn test_override_does_not_leak_across_kinds() {
        let table = table();
        assert_eq!(
            table.lookup(&debian_facts("7.0"), ResourceKind::Package),
            Some(APT)
        );
    }

    #[test]
    fn test_unknown_family_falls_to_global_default() {
        let table = table();
        let facts = HostFacts::new("linux", "slackware", "slackware", "14.1");
        assert_eq!(table.lookup(&facts, ResourceKind::Service), Some(INIT));
        assert_eq!(table.lookup(&facts, ResourceKind::Package), None);
    }

    #[test]
    fn test_family_without_kind_falls_to_global_default() {
        let table = PlatformTable::new()
            .family(
                "debian",
                FamilyRules::new().provider(ResourceKind::Package, APT),
            )
            .default_provider(ResourceKind::Service, INIT);
        assert_eq!(
            table.lookup(&debian_facts("7.0"), ResourceKind::Service),
            Some(INIT)
        );
    }
}
