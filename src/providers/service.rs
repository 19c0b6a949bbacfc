//! Service provider variants
//!
//! One entry per service-management mechanism. Each variant is a data
//! record: which hosts it is enabled on, how it decides whether it can
//! handle a specific service (host-wide tooling, per-service config
//! artifacts, or both), and which other variants it supersedes when they
//! would otherwise match the same service.

use convergence::{
    Action, HostFacts, ProbeError, Provider, ProviderId, ProviderVariant, ResourceDeclaration,
    ResourceKind, RunContext, ServiceConfig, Subsystem, SubsystemProbe,
};

pub const SERVICE_DEBIAN: ProviderId = ProviderId::new("service.debian");
pub const SERVICE_FREEBSD: ProviderId = ProviderId::new("service.freebsd");
pub const SERVICE_INIT: ProviderId = ProviderId::new("service.init");
pub const SERVICE_INSSERV: ProviderId = ProviderId::new("service.insserv");
pub const SERVICE_INVOKERCD: ProviderId = ProviderId::new("service.invokercd");
pub const SERVICE_MACOSX: ProviderId = ProviderId::new("service.macosx");
pub const SERVICE_REDHAT: ProviderId = ProviderId::new("service.redhat");
pub const SERVICE_SOLARIS: ProviderId = ProviderId::new("service.solaris");
pub const SERVICE_SYSTEMD: ProviderId = ProviderId::new("service.systemd");
pub const SERVICE_UPSTART: ProviderId = ProviderId::new("service.upstart");
pub const SERVICE_WINDOWS: ProviderId = ProviderId::new("service.windows");

/// How a variant decides it can handle a specific service
#[derive(Debug, Clone, Copy)]
enum Claim {
    /// The host-wide tooling is installed
    Installed(Subsystem),
    /// The service has a config artifact under one of these conventions
    Configured(&'static [ServiceConfig]),
    /// The tooling is installed and the service is configured for it
    InstalledAndConfigured(Subsystem, ServiceConfig),
    /// The platform-native manager handles every service
    Native,
}

/// A service provider variant as a capability record
pub struct ServiceVariant {
    id: ProviderId,
    /// OS values this variant runs on; empty means any
    os: &'static [&'static str],
    claim: Claim,
    replaces: &'static [ProviderId],
    /// Mechanism name used in descriptions
    mechanism: &'static str,
}

impl ProviderVariant for ServiceVariant {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn implements(&self, kind: ResourceKind) -> bool {
        kind == ResourceKind::Service
    }

    fn enabled(&self, facts: &HostFacts) -> bool {
        self.os.is_empty() || self.os.contains(&facts.os.as_str())
    }

    fn handles(
        &self,
        resource: &ResourceDeclaration,
        _action: Action,
        probe: &dyn SubsystemProbe,
    ) -> Result<bool, ProbeError> {
        match self.claim {
            Claim::Native => Ok(true),
            Claim::Installed(subsystem) => Ok(probe.installed_subsystems()?.contains(&subsystem)),
            Claim::Configured(configs) => {
                let configured = probe.configured_subsystems(&resource.name)?;
                Ok(configs.iter().any(|config| configured.contains(config)))
            }
            Claim::InstalledAndConfigured(subsystem, config) => {
                if !probe.installed_subsystems()?.contains(&subsystem) {
                    return Ok(false);
                }
                Ok(probe.configured_subsystems(&resource.name)?.contains(&config))
            }
        }
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
        Box::new(ServiceProvider {
            variant: self.id,
            mechanism: self.mechanism,
            resource: resource.clone(),
            action,
        })
    }
}

/// A resolved service provider bound to one service and action
#[derive(Debug)]
pub struct ServiceProvider {
    variant: ProviderId,
    mechanism: &'static str,
    resource: ResourceDeclaration,
    action: Action,
}

impl Provider for ServiceProvider {
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
            "{} service {} via {}",
            self.action, self.resource.name, self.mechanism
        )
    }
}

/// The closed enumeration of service variants
pub fn variants() -> Vec<Box<dyn ProviderVariant>> {
    vec![
        Box::new(ServiceVariant {
            id: SERVICE_INIT,
            os: &["linux"],
            claim: Claim::Configured(&[ServiceConfig::Initd]),
            replaces: &[],
            mechanism: "/etc/init.d",
        }),
        Box::new(ServiceVariant {
            id: SERVICE_DEBIAN,
            os: &["linux"],
            claim: Claim::Installed(Subsystem::Debian),
            replaces: &[SERVICE_INIT, SERVICE_INVOKERCD],
            mechanism: "update-rc.d",
        }),
        Box::new(ServiceVariant {
            id: SERVICE_INVOKERCD,
            os: &["linux"],
            claim: Claim::Installed(Subsystem::Invokercd),
            replaces: &[SERVICE_INIT],
            mechanism: "invoke-rc.d",
        }),
        Box::new(ServiceVariant {
            id: SERVICE_INSSERV,
            os: &["linux"],
            claim: Claim::Installed(Subsystem::Insserv),
            replaces: &[SERVICE_INIT, SERVICE_DEBIAN, SERVICE_INVOKERCD, SERVICE_REDHAT],
            mechanism: "insserv",
        }),
        Box::new(ServiceVariant {
            id: SERVICE_UPSTART,
            os: &["linux"],
            claim: Claim::Configured(&[ServiceConfig::Upstart]),
            replaces: &[
                SERVICE_INIT,
                SERVICE_DEBIAN,
                SERVICE_INVOKERCD,
                SERVICE_INSSERV,
                SERVICE_REDHAT,
            ],
            mechanism: "upstart",
        }),
        Box::new(ServiceVariant {
            id: SERVICE_REDHAT,
            os: &["linux"],
            claim: Claim::Installed(Subsystem::Redhat),
            replaces: &[SERVICE_INIT],
            mechanism: "chkconfig",
        }),
        Box::new(ServiceVariant {
            id: SERVICE_SYSTEMD,
            os: &["linux"],
            claim: Claim::InstalledAndConfigured(Subsystem::Systemd, ServiceConfig::Systemd),
            replaces: &[
                SERVICE_INIT,
                SERVICE_DEBIAN,
                SERVICE_INVOKERCD,
                SERVICE_INSSERV,
                SERVICE_UPSTART,
                SERVICE_REDHAT,
            ],
            mechanism: "systemctl",
        }),
        Box::new(ServiceVariant {
            id: SERVICE_FREEBSD,
            os: &["freebsd", "netbsd"],
            claim: Claim::Configured(&[ServiceConfig::EtcRcd, ServiceConfig::UsrLocalEtcRcd]),
            replaces: &[SERVICE_INIT],
            mechanism: "rc.d",
        }),
        Box::new(ServiceVariant {
            id: SERVICE_MACOSX,
            os: &["darwin"],
            claim: Claim::Native,
            replaces: &[],
            mechanism: "launchctl",
        }),
        Box::new(ServiceVariant {
            id: SERVICE_SOLARIS,
            os: &["solaris2"],
            claim: Claim::Native,
            replaces: &[],
            mechanism: "svcadm",
        }),
        Box::new(ServiceVariant {
            id: SERVICE_WINDOWS,
            os: &["windows"],
            claim: Claim::Native,
            replaces: &[],
            mechanism: "the service control manager",
        }),
    ]
}
