//! Resource declarations
//!
//! A [`ResourceDeclaration`] is the caller's statement of desired system
//! state ("service ntp", "file /etc/motd") handed to the resolver together
//! with the requested [`Action`]. Declarations are immutable for the
//! duration of a resolve call.

use crate::provider::ProviderId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Resource type vocabulary.
///
/// Fixed but extensible: adding a kind means adding an enum variant plus
/// its table entries, not editing a central registry at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Service,
    File,
    Package,
    Directory,
    Link,
    Template,
    Execute,
    Script,
}

impl ResourceKind {
    /// Every kind in the vocabulary, in display order
    pub const ALL: [Self; 8] = [
        Self::Service,
        Self::File,
        Self::Package,
        Self::Directory,
        Self::Link,
        Self::Template,
        Self::Execute,
        Self::Script,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::File => "file",
            Self::Package => "package",
            Self::Directory => "directory",
            Self::Link => "link",
            Self::Template => "template",
            Self::Execute => "execute",
            Self::Script => "script",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown resource type in a parsed declaration
#[derive(Debug, Error)]
#[error("unknown resource type `{0}`")]
pub struct UnknownResourceKind(String);

impl FromStr for ResourceKind {
    type Err = UnknownResourceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownResourceKind(s.to_string()))
    }
}

/// The action a resource should be converged toward
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Start,
    Stop,
    Restart,
    Reload,
    Enable,
    Disable,
    Create,
    Delete,
    Touch,
    Install,
    Remove,
    Upgrade,
    #[default]
    Nothing,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Reload => "reload",
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Touch => "touch",
            Self::Install => "install",
            Self::Remove => "remove",
            Self::Upgrade => "upgrade",
            Self::Nothing => "nothing",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown action in a parsed declaration
#[derive(Debug, Error)]
#[error("unknown action `{0}`")]
pub struct UnknownAction(String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [Action; 13] = [
            Action::Start,
            Action::Stop,
            Action::Restart,
            Action::Reload,
            Action::Enable,
            Action::Disable,
            Action::Create,
            Action::Delete,
            Action::Touch,
            Action::Install,
            Action::Remove,
            Action::Upgrade,
            Action::Nothing,
        ];
        ALL.into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// A declared resource awaiting provider resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDeclaration {
    /// Resource type tag
    pub kind: ResourceKind,
    /// Resource name, e.g. the service name or file path
    pub name: String,
    /// Explicit provider override; skips every resolution stage when set
    pub provider: Option<ProviderId>,
}

impl ResourceDeclaration {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            provider: None,
        }
    }

    /// Pin this declaration to an explicit provider
    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }
}

/// Structured identification of a resource inside a resolution failure.
///
/// Carries enough detail for a caller to render a precise operator-facing
/// error without re-deriving context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub name: String,
    pub action: Action,
    /// The explicit override the caller requested, if any
    pub provider: Option<ProviderId>,
}

impl ResourceRef {
    pub fn new(resource: &ResourceDeclaration, action: Action) -> Self {
        Self {
            kind: resource.kind,
            name: resource.name.clone(),
            action,
            provider: resource.provider,
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] action={}", self.kind, self.name, self.action)?;
        if let Some(provider) = self.provider {
            write!(f, " provider={provider}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parses_from_str() {
        assert_eq!("service".parse::<ResourceKind>().unwrap(), ResourceKind::Service);
        assert_eq!("file".parse::<ResourceKind>().unwrap(), ResourceKind::File);
        assert!("database".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_action_parses_from_str() {
        assert_eq!("start".parse::<Action>().unwrap(), Action::Start);
        assert_eq!("install".parse::<Action>().unwrap(), Action::Install);
        assert!("explode".parse::<Action>().is_err());
    }

    #[test]
    fn test_resource_ref_display() {
        let resource = ResourceDeclaration::new(ResourceKind::Service, "ntp");
        let reference = ResourceRef::new(&resource, Action::Start);
        assert_eq!(reference.to_string(), "service[ntp] action=start");
    }

    #[test]
    fn test_resource_ref_display_with_override() {
        use crate::provider::ProviderId;

        let resource = ResourceDeclaration::new(ResourceKind::Service, "ntp")
            .with_provider(ProviderId::new("service.upstart"));
        let reference = ResourceRef::new(&resource, Action::Stop);
        assert_eq!(
            reference.to_string(),
            "service[ntp] action=stop provider=service.upstart"
        );
    }
}
