//! The provider catalog
//!
//! The closed enumeration of every provider variant steward knows, plus
//! the static tables that back resolution when dynamic discovery comes up
//! empty. Adding a host-OS variant means adding a catalog entry with its
//! four capability facets - no central registry file is edited anywhere
//! else.

use convergence::{
    ConfigurationError, FallbackTable, FamilyRules, PlatformTable, ProviderRegistry, ResourceKind,
    VersionRule,
};

pub mod file;
pub mod package;
pub mod service;

pub use file::FILE_DEFAULT;
pub use service::{
    SERVICE_DEBIAN, SERVICE_FREEBSD, SERVICE_INIT, SERVICE_INSSERV, SERVICE_INVOKERCD,
    SERVICE_MACOSX, SERVICE_REDHAT, SERVICE_SOLARIS, SERVICE_SYSTEMD, SERVICE_UPSTART,
    SERVICE_WINDOWS,
};

/// Assemble the full registry during startup
pub fn registry() -> Result<ProviderRegistry, ConfigurationError> {
    let mut registry = ProviderRegistry::new();
    for variant in service::variants() {
        registry.register(variant)?;
    }
    registry.register(Box::new(file::FileVariant))?;
    for variant in package::variants() {
        registry.register(variant)?;
    }
    Ok(registry)
}

/// Default providers for the force-dynamic resource types.
///
/// The service entry is the coarse per-OS best-guess used for why-run
/// and error reporting when no subsystem claims a service.
pub fn fallback_table() -> FallbackTable {
    FallbackTable::new()
        .fixed(ResourceKind::File, FILE_DEFAULT)
        .by_os(
            ResourceKind::Service,
            [
                ("freebsd", SERVICE_FREEBSD),
                ("netbsd", SERVICE_FREEBSD),
                ("darwin", SERVICE_MACOSX),
                ("windows", SERVICE_WINDOWS),
                ("solaris2", SERVICE_SOLARIS),
            ],
            SERVICE_INIT,
        )
}

/// The legacy platform table consumed as the final fallback for resource
/// types outside the force-dynamic set
pub fn platform_table() -> PlatformTable {
    PlatformTable::new()
        .family(
            "debian",
            FamilyRules::new()
                .provider(ResourceKind::Service, SERVICE_DEBIAN)
                .provider(ResourceKind::Package, package::PACKAGE_APT)
                .when(
                    VersionRule::at_least("6.0"),
                    ResourceKind::Service,
                    SERVICE_INSSERV,
                ),
        )
        .family(
            "rhel",
            FamilyRules::new()
                .provider(ResourceKind::Service, SERVICE_REDHAT)
                .provider(ResourceKind::Package, package::PACKAGE_YUM),
        )
        .family(
            "suse",
            FamilyRules::new()
                .provider(ResourceKind::Service, SERVICE_REDHAT)
                .provider(ResourceKind::Package, package::PACKAGE_ZYPPER),
        )
        .family(
            "arch",
            FamilyRules::new()
                .provider(ResourceKind::Service, SERVICE_SYSTEMD)
                .provider(ResourceKind::Package, package::PACKAGE_PACMAN),
        )
        .family(
            "mac_os_x",
            FamilyRules::new()
                .provider(ResourceKind::Service, SERVICE_MACOSX)
                .provider(ResourceKind::Package, package::PACKAGE_HOMEBREW),
        )
        .family(
            "freebsd",
            FamilyRules::new()
                .provider(ResourceKind::Service, SERVICE_FREEBSD)
                .provider(ResourceKind::Package, package::PACKAGE_FREEBSD),
        )
        .family(
            "windows",
            FamilyRules::new().provider(ResourceKind::Service, SERVICE_WINDOWS),
        )
        .family(
            "solaris2",
            FamilyRules::new().provider(ResourceKind::Service, SERVICE_SOLARIS),
        )
        .default_provider(ResourceKind::Service, SERVICE_INIT)
}
