//! Package provider variants
//!
//! Package managers predate capability dispatch: they are selected
//! exclusively through the platform table, so their `handles` predicate
//! never claims a resource dynamically. They still register so table
//! lookups resolve to constructible variants.

use convergence::{
    Action, HostFacts, ProbeError, Provider, ProviderId, ProviderVariant, ResourceDeclaration,
    ResourceKind, RunContext, SubsystemProbe,
};

pub const PACKAGE_APT: ProviderId = ProviderId::new("package.apt");
pub const PACKAGE_FREEBSD: ProviderId = ProviderId::new("package.freebsd");
pub const PACKAGE_HOMEBREW: ProviderId = ProviderId::new("package.homebrew");
pub const PACKAGE_PACMAN: ProviderId = ProviderId::new("package.pacman");
pub const PACKAGE_YUM: ProviderId = ProviderId::new("package.yum");
pub const PACKAGE_ZYPPER: ProviderId = ProviderId::new("package.zypper");

/// A package manager variant as a capability record
pub struct PackageVariant {
    id: ProviderId,
    /// Platform families this manager belongs to
    families: &'static [&'static str],
    /// Tool name used in descriptions
    tool: &'static str,
}

impl ProviderVariant for PackageVariant {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn implements(&self, kind: ResourceKind) -> bool {
        kind == ResourceKind::Package
    }

    fn enabled(&self, facts: &HostFacts) -> bool {
        self.families.contains(&facts.platform_family.as_str())
    }

    fn handles(
        &self,
        _resource: &ResourceDeclaration,
        _action: Action,
        _probe: &dyn SubsystemProbe,
    ) -> Result<bool, ProbeError> {
        // selected through the platform table, never dynamically
        Ok(false)
    }

    fn construct(
        &self,
        resource: &ResourceDeclaration,
        action: Action,
        _ctx: &RunContext,
    ) -> Box<dyn Provider> {
        Box::new(PackageProvider {
            variant: self.id,
            tool: self.tool,
            resource: resource.clone(),
            action,
        })
    }
}

/// A resolved package provider bound to one package and action
#[derive(Debug)]
pub struct PackageProvider {
    variant: ProviderId,
    tool: &'static str,
    resource: ResourceDeclaration,
    action: Action,
}

impl Provider for PackageProvider {
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
        format!(
            "{} package {} via {}",
            self.action, self.resource.name, self.tool
        )
    }
}

/// The closed enumeration of package variants
pub fn variants() -> Vec<Box<dyn ProviderVariant>> {
    vec![
        Box::new(PackageVariant {
            id: PACKAGE_APT,
            families: &["debian"],
            tool: "apt-get",
        }),
        Box::new(PackageVariant {
            id: PACKAGE_YUM,
            families: &["rhel"],
            tool: "yum",
        }),
        Box::new(PackageVariant {
            id: PACKAGE_ZYPPER,
            families: &["suse"],
            tool: "zypper",
        }),
        Box::new(PackageVariant {
            id: PACKAGE_PACMAN,
            families: &["arch"],
            tool: "pacman",
        }),
        Box::new(PackageVariant {
            id: PACKAGE_FREEBSD,
            families: &["freebsd", "netbsd"],
            tool: "pkg",
        }),
        Box::new(PackageVariant {
            id: PACKAGE_HOMEBREW,
            families: &["mac_os_x"],
            tool: "brew",
        }),
    ]
}
