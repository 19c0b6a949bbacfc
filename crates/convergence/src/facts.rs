//! Host platform facts
//!
//! A [`HostFacts`] value is an immutable snapshot of platform identity:
//! operating system family, platform name and version, plus an open-ended
//! attribute lookup used by capability predicates. The resolver only ever
//! reads a snapshot handed to it; callers decide whether that snapshot
//! comes from [`HostFacts::detect`] or from an inventory system.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Immutable snapshot of platform identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFacts {
    /// Operating system family: "linux", "darwin", "windows", "freebsd",
    /// "netbsd", "solaris2"
    pub os: String,
    /// Platform name, e.g. "ubuntu", "debian", "fedora", "mac_os_x"
    pub platform: String,
    /// Platform family grouping related platforms, e.g. "debian", "rhel"
    pub platform_family: String,
    /// Platform version as reported by the OS, e.g. "14.04", "10.0-RELEASE"
    pub platform_version: String,
    /// Open-ended attributes (architecture, kernel details, ...)
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl HostFacts {
    /// Create a snapshot from explicit values
    pub fn new(
        os: impl Into<String>,
        platform: impl Into<String>,
        platform_family: impl Into<String>,
        platform_version: impl Into<String>,
    ) -> Self {
        Self {
            os: os.into(),
            platform: platform.into(),
            platform_family: platform_family.into(),
            platform_version: platform_version.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Attach an open-ended attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an open-ended attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Detect facts for the machine we are running on.
    ///
    /// On Linux, platform name, family, and version come from
    /// `/etc/os-release`; elsewhere they are derived from the compile-time
    /// target. The machine architecture is always recorded as the
    /// `machine` attribute.
    pub fn detect() -> Self {
        let os = canonical_os(std::env::consts::OS);

        let facts = match os {
            "linux" => {
                let release = OsRelease::load(Path::new("/etc/os-release")).unwrap_or_default();
                let family = derive_family(&release.id, &release.id_like);
                Self::new("linux", release.id, family, release.version_id)
            }
            "darwin" => Self::new("darwin", "mac_os_x", "mac_os_x", ""),
            "windows" => Self::new("windows", "windows", "windows", ""),
            "freebsd" | "netbsd" => Self::new(os, os, os, ""),
            "solaris2" => Self::new("solaris2", "solaris2", "solaris2", ""),
            other => Self::new(other, other, other, ""),
        };

        facts.with_attribute("machine", std::env::consts::ARCH)
    }
}

/// Map the Rust target OS onto the fact vocabulary
fn canonical_os(target_os: &str) -> &str {
    match target_os {
        "macos" => "darwin",
        "solaris" | "illumos" => "solaris2",
        other => other,
    }
}

/// Group a platform id into its family
fn derive_family(id: &str, id_like: &str) -> String {
    for candidate in std::iter::once(id).chain(id_like.split_whitespace()) {
        match candidate {
            "debian" | "ubuntu" => return "debian".to_string(),
            "rhel" | "centos" | "fedora" | "amzn" => return "rhel".to_string(),
            "suse" | "opensuse" | "sles" => return "suse".to_string(),
            "arch" => return "arch".to_string(),
            "gentoo" => return "gentoo".to_string(),
            _ => {}
        }
    }
    id.to_string()
}

/// The subset of /etc/os-release the fact detector reads
#[derive(Debug, Default)]
struct OsRelease {
    id: String,
    id_like: String,
    version_id: String,
}

impl OsRelease {
    fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        let mut release = Self::default();

        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            match key.trim() {
                "ID" => release.id = value.to_string(),
                "ID_LIKE" => release.id_like = value.to_string(),
                "VERSION_ID" => release.version_id = value.to_string(),
                _ => {}
            }
        }

        Some(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_os_release(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write os-release");
        file
    }

    #[test]
    fn test_os_release_parsing_strips_quotes() {
        let file = write_os_release(
            "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\nVERSION_ID=\"14.04\"\n",
        );
        let release = OsRelease::load(file.path()).expect("parse os-release");
        assert_eq!(release.id, "ubuntu");
        assert_eq!(release.id_like, "debian");
        assert_eq!(release.version_id, "14.04");
    }

    #[test]
    fn test_os_release_ignores_unknown_keys() {
        let file = write_os_release("PRETTY_NAME=\"Debian GNU/Linux 7\"\nID=debian\n");
        let release = OsRelease::load(file.path()).expect("parse os-release");
        assert_eq!(release.id, "debian");
        assert_eq!(release.id_like, "");
    }

    #[test]
    fn test_family_from_id_like() {
        assert_eq!(derive_family("ubuntu", "debian"), "debian");
        assert_eq!(derive_family("centos", "rhel fedora"), "rhel");
        assert_eq!(derive_family("linuxmint", "ubuntu debian"), "debian");
    }

    #[test]
    fn test_family_falls_back_to_id() {
        assert_eq!(derive_family("slackware", ""), "slackware");
    }

    #[test]
    fn test_attribute_lookup() {
        let facts = HostFacts::new("linux", "ubuntu", "debian", "14.04")
            .with_attribute("machine", "x86_64");
        assert_eq!(facts.attribute("machine"), Some("x86_64"));
        assert_eq!(facts.attribute("missing"), None);
    }

    #[test]
    fn test_canonical_os_mapping() {
        assert_eq!(canonical_os("macos"), "darwin");
        assert_eq!(canonical_os("illumos"), "solaris2");
        assert_eq!(canonical_os("linux"), "linux");
    }
}
