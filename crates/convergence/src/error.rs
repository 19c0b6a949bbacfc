//! Error types for provider resolution

use crate::provider::ProviderId;
use crate::resource::{ResourceKind, ResourceRef};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors that can terminate a resolve call
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Two or more dynamically discovered variants survived filtering.
    /// Never auto-broken by picking the first match.
    #[error("ambiguous provider resolution for {resource}: tied candidates [{}]", join_ids(.candidates))]
    Ambiguous {
        resource: ResourceRef,
        candidates: Vec<ProviderId>,
    },

    /// Every resolution stage was exhausted without a match
    #[error("no provider found for {resource}")]
    NoProvider { resource: ResourceRef },

    /// A subsystem probe could not be evaluated
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Registry/table inconsistency - a build-time registration bug,
    /// not an environment condition
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Inconsistencies between the registry and the resolution tables
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A force-dynamic resource type reached the fallback table without an entry
    #[error("no static fallback mapping for resource type `{kind}`")]
    MissingFallback { kind: ResourceKind },

    /// A table selected a provider id that was never registered
    #[error("provider `{id}` is referenced but not registered")]
    Unregistered { id: ProviderId },

    /// Two variants were registered under the same id
    #[error("provider `{id}` is already registered")]
    Duplicate { id: ProviderId },
}

/// Failures while probing the host for service-management subsystems.
///
/// A path that simply does not exist is a clean negative, not an error;
/// these variants cover everything else.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The external service-manager query exited unsuccessfully.
    /// Status is -1 when the process was killed by a signal.
    #[error("probe command `{command}` failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    /// The external query did not finish within the allotted time
    #[error("probe command `{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// The external query produced output the parser cannot read
    #[error("probe command `{command}` produced unreadable output")]
    UnexpectedOutput { command: String },

    /// The external query could not be launched at all
    #[error("probe command `{command}` could not be run: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// A filesystem existence check raised something other than "absent"
    #[error("probe failed to inspect {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn join_ids(ids: &[ProviderId]) -> String {
    ids.iter()
        .map(ProviderId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Action, ResourceDeclaration, ResourceKind};

    #[test]
    fn test_ambiguous_display_lists_candidates() {
        let resource = ResourceDeclaration::new(ResourceKind::Service, "ntp");
        let err = ResolveError::Ambiguous {
            resource: ResourceRef::new(&resource, Action::Start),
            candidates: vec![
                ProviderId::new("service.debian"),
                ProviderId::new("service.redhat"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("service[ntp]"));
        assert!(msg.contains("service.debian, service.redhat"));
    }

    #[test]
    fn test_probe_error_wraps_into_resolve_error() {
        let probe = ProbeError::CommandFailed {
            command: "systemctl --all".to_string(),
            status: 1,
            stderr: "failed to connect to bus".to_string(),
        };
        let err: ResolveError = probe.into();
        assert!(matches!(err, ResolveError::Probe(_)));
        assert!(err.to_string().contains("systemctl --all"));
    }

    #[test]
    fn test_configuration_error_display() {
        let err = ConfigurationError::MissingFallback {
            kind: ResourceKind::Package,
        };
        assert!(err.to_string().contains("package"));
    }
}
