//! File provider variant

use convergence::{
    Action, HostFacts, ProbeError, Provider, ProviderId, ProviderVariant, ResourceDeclaration,
    ResourceKind, RunContext, SubsystemProbe,
};

pub const FILE_DEFAULT: ProviderId = ProviderId::new("file.default");

/// The standard file provider: plain filesystem writes work everywhere,
/// so it is enabled on every host and claims every file resource.
pub struct FileVariant;

impl ProviderVariant for FileVariant {
    fn id(&self) -> ProviderId {
        FILE_DEFAULT
    }

    fn implements(&self, kind: ResourceKind) -> bool {
        kind == ResourceKind::File
    }

    fn enabled(&self, _facts: &HostFacts) -> bool {
        true
    }

    fn handles(
        &self,
        _resource: &ResourceDeclaration,
        _action: Action,
        _probe: &dyn SubsystemProbe,
    ) -> Result<bool, ProbeError> {
        Ok(true)
    }

    fn construct(
        &self,
        resource: &ResourceDeclaration,
        action: Action,
        _ctx: &RunContext,
    ) -> Box<dyn Provider> {
        Box::new(FileProvider {
            resource: resource.clone(),
            action,
        })
    }
}

/// A resolved file provider bound to one path and action
#[derive(Debug)]
pub struct FileProvider {
    resource: ResourceDeclaration,
    action: Action,
}

impl Provider for FileProvider {
    fn variant(&self) -> ProviderId {
        FILE_DEFAULT
    }

    fn resource(&self) -> &ResourceDeclaration {
        &self.resource
    }

    fn action(&self) -> Action {
        self.action
    }

    fn describe(&self) -> String {
        format!("{} file {}", self.action, self.resource.name)
    }
}
