//! Service-management subsystem probing
//!
//! Sorts out the mess of different mechanisms that can start services on a
//! host: which frameworks are installed at all, and which ones a specific
//! named service is actually configured for. Everything is recomputed on
//! demand from filesystem reads plus one external service-manager query;
//! nothing is cached between calls.

use crate::error::ProbeError;
use crate::runner::CommandRunner;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A service-management framework installed host-wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Subsystem {
    /// update-rc.d style Debian init tooling
    Debian,
    /// invoke-rc.d wrapper
    Invokercd,
    /// insserv dependency-based init ordering
    Insserv,
    /// Upstart job supervisor
    Upstart,
    /// chkconfig style Red Hat init tooling
    Redhat,
    /// systemd service manager
    Systemd,
}

impl Subsystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debian => "debian",
            Self::Invokercd => "invokercd",
            Self::Insserv => "insserv",
            Self::Upstart => "upstart",
            Self::Redhat => "redhat",
            Self::Systemd => "systemd",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A convention under which a specific service is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceConfig {
    /// Classic /etc/init.d script
    Initd,
    /// /etc/init/<name>.conf Upstart job
    Upstart,
    /// /etc/xinetd.d entry
    Xinetd,
    /// /etc/rc.d script (BSD convention)
    EtcRcd,
    /// /usr/local/etc/rc.d script (BSD ports convention)
    UsrLocalEtcRcd,
    /// systemd unit known to the service manager
    Systemd,
}

impl ServiceConfig {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initd => "initd",
            Self::Upstart => "upstart",
            Self::Xinetd => "xinetd",
            Self::EtcRcd => "etc-rcd",
            Self::UsrLocalEtcRcd => "usr-local-etc-rcd",
            Self::Systemd => "systemd",
        }
    }
}

impl fmt::Display for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host inspection consumed by `handles` predicates.
///
/// Both operations are pure reads. Results are ordered sets in fixed
/// declaration order so resolution stays reproducible.
pub trait SubsystemProbe: Send + Sync {
    /// Which service-management frameworks are installed on this host
    fn installed_subsystems(&self) -> Result<Vec<Subsystem>, ProbeError>;

    /// Which conventions a specific named service is configured under
    fn configured_subsystems(&self, service_name: &str) -> Result<Vec<ServiceConfig>, ProbeError>;
}

/// Well-known paths, relative to the probe root
const UPDATE_RCD: &str = "usr/sbin/update-rc.d";
const INVOKE_RCD: &str = "usr/sbin/invoke-rc.d";
const INSSERV: &str = "sbin/insserv";
const ETC_INIT: &str = "etc/init";
const SBIN_START: &str = "sbin/start";
const CHKCONFIG: &str = "sbin/chkconfig";
const SYSTEMCTL: &str = "bin/systemctl";

/// The real prober: filesystem existence checks plus the systemd query.
///
/// The probe root defaults to `/`; tests point it at a scratch tree.
pub struct HostProbe {
    root: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl HostProbe {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_root("/", runner)
    }

    /// Re-root every well-known path under a prefix
    pub fn with_root(root: impl AsRef<Path>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            runner,
        }
    }

    /// Existence check distinguishing "absent" from a real I/O failure
    fn exists(&self, relative: &str) -> Result<bool, ProbeError> {
        let path = self.root.join(relative);
        match fs::symlink_metadata(&path) {
            Ok(_) => Ok(true),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(ProbeError::Io { path, source }),
        }
    }

    fn systemd_unit_listed(&self, service_name: &str) -> Result<bool, ProbeError> {
        let units = self.systemctl_units("--all")?;
        if units.contains(service_name) {
            return Ok(true);
        }
        let unit_files = self.systemctl_units("--list-unit-files")?;
        Ok(unit_files.contains(service_name))
    }

    fn systemctl_units(&self, flag: &str) -> Result<BTreeSet<String>, ProbeError> {
        let output = self.runner.run("systemctl", &[flag])?;
        if !output.success() {
            return Err(ProbeError::CommandFailed {
                command: format!("systemctl {flag}"),
                status: output.status.unwrap_or(-1),
                stderr: output.stderr_str().trim().to_string(),
            });
        }
        let text =
            std::str::from_utf8(&output.stdout).map_err(|_| ProbeError::UnexpectedOutput {
                command: format!("systemctl {flag}"),
            })?;
        Ok(unit_names(text))
    }
}

/// Collect unit names from line-oriented `systemctl` output.
///
/// Each line contributes its first whitespace-delimited token, both as-is
/// ("ntp.service") and with the trailing type suffix stripped ("ntp").
fn unit_names(output: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for line in output.lines() {
        let Some(unit) = line.split_whitespace().next() else {
            continue;
        };
        if let Some((stem, _suffix)) = unit.rsplit_once('.') {
            names.insert(stem.to_string());
        }
        names.insert(unit.to_string());
    }
    names
}

impl SubsystemProbe for HostProbe {
    fn installed_subsystems(&self) -> Result<Vec<Subsystem>, ProbeError> {
        let mut subsystems = Vec::new();

        if self.exists(UPDATE_RCD)? {
            subsystems.push(Subsystem::Debian);
        }
        if self.exists(INVOKE_RCD)? {
            subsystems.push(Subsystem::Invokercd);
        }
        if self.exists(INSSERV)? {
            subsystems.push(Subsystem::Insserv);
        }
        // /etc/init alone is ambiguous: Debian >= 6.0 ships it without
        // Upstart, so the job tool must be present too.
        if self.exists(ETC_INIT)? && self.exists(SBIN_START)? {
            subsystems.push(Subsystem::Upstart);
        }
        if self.exists(CHKCONFIG)? {
            subsystems.push(Subsystem::Redhat);
        }
        if self.exists(SYSTEMCTL)? {
            subsystems.push(Subsystem::Systemd);
        }

        Ok(subsystems)
    }

    fn configured_subsystems(&self, service_name: &str) -> Result<Vec<ServiceConfig>, ProbeError> {
        let mut configs = Vec::new();

        if self.exists(&format!("etc/init.d/{service_name}"))? {
            configs.push(ServiceConfig::Initd);
        }
        if self.exists(&format!("etc/init/{service_name}.conf"))? {
            configs.push(ServiceConfig::Upstart);
        }
        if self.exists(&format!("etc/xinetd.d/{service_name}"))? {
            configs.push(ServiceConfig::Xinetd);
        }
        if self.exists(&format!("etc/rc.d/{service_name}"))? {
            configs.push(ServiceConfig::EtcRcd);
        }
        if self.exists(&format!("usr/local/etc/rc.d/{service_name}"))? {
            configs.push(ServiceConfig::UsrLocalEtcRcd);
        }
        // Only query the service manager where it exists; its absence is
        // a clean negative, but a failing query must surface.
        if self.exists(SYSTEMCTL)? && self.systemd_unit_listed(service_name)? {
            configs.push(ServiceConfig::Systemd);
        }

        Ok(configs)
    }
}
