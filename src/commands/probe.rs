//! `steward probe` - show detected service-management subsystems

use crate::cli::ProbeArgs;
use anyhow::Result;
use colored::Colorize;
use convergence::{HostProbe, SubsystemProbe, SystemRunner};
use serde_json::json;
use std::sync::Arc;

pub fn run(args: ProbeArgs) -> Result<()> {
    let runner = Arc::new(SystemRunner::new());
    let probe = HostProbe::new(runner);

    let installed = probe.installed_subsystems()?;
    let configured = match &args.service {
        Some(service) => Some(probe.configured_subsystems(service)?),
        None => None,
    };

    if args.json {
        let mut out = json!({ "installed": installed });
        if let (Some(service), Some(configured)) = (&args.service, &configured) {
            out["service"] = json!(service);
            out["configured"] = json!(configured);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", "Installed subsystems".bold());
    if installed.is_empty() {
        println!("  {}", "none detected".dimmed());
    }
    for subsystem in &installed {
        println!("  {} {}", "•".blue(), subsystem);
    }

    if let (Some(service), Some(configured)) = (&args.service, &configured) {
        println!();
        println!("{}", format!("Configured for {service}").bold());
        if configured.is_empty() {
            println!("  {}", "none detected".dimmed());
        }
        for config in configured {
            println!("  {} {}", "•".blue(), config);
        }
    }

    Ok(())
}
