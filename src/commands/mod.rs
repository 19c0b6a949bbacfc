//! CLI subcommand implementations

use anyhow::{Context, Result};
use convergence::HostFacts;
use std::fs;
use std::path::Path;

pub mod probe;
pub mod providers;
pub mod resolve;

/// Load host facts from a TOML override file, or detect the local host
pub fn host_facts(path: Option<&Path>) -> Result<HostFacts> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read facts file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Invalid facts file {}", path.display()))
        }
        None => Ok(HostFacts::detect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_facts_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        write!(
            file,
            "os = \"linux\"\nplatform = \"debian\"\nplatform_family = \"debian\"\nplatform_version = \"7.0\"\n\n[attributes]\nmachine = \"x86_64\"\n"
        )
        .expect("write facts");

        let facts = host_facts(Some(file.path())).expect("load facts");
        assert_eq!(facts.platform, "debian");
        assert_eq!(facts.attribute("machine"), Some("x86_64"));
    }

    #[test]
    fn test_invalid_facts_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        write!(file, "os = 42\n").expect("write facts");
        assert!(host_facts(Some(file.path())).is_err());
    }
}
