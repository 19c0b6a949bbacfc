//! `steward providers` - list the registered variant catalog

use crate::cli::ProvidersArgs;
use crate::providers;
use anyhow::Result;
use colored::Colorize;
use convergence::{HostFacts, ResourceKind};
use serde_json::json;

pub fn run(args: ProvidersArgs) -> Result<()> {
    let kind_filter: Option<ResourceKind> = match &args.kind {
        Some(kind) => Some(kind.parse()?),
        None => None,
    };

    let registry = providers::registry()?;
    let facts = HostFacts::detect();

    let mut rows = Vec::new();
    for variant in registry.variants() {
        let kinds: Vec<ResourceKind> = ResourceKind::ALL
            .into_iter()
            .filter(|kind| variant.implements(*kind))
            .collect();
        if let Some(filter) = kind_filter
            && !kinds.contains(&filter)
        {
            continue;
        }
        rows.push((variant.id(), kinds, variant.enabled(&facts)));
    }

    if args.json {
        let out: Vec<_> = rows
            .iter()
            .map(|(id, kinds, enabled)| {
                json!({ "id": id, "implements": kinds, "enabled": enabled })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", "Registered providers".bold());
    for (id, kinds, enabled) in rows {
        let marker = if enabled {
            "✓".green()
        } else {
            "✗".dimmed()
        };
        let kinds = kinds
            .iter()
            .map(ResourceKind::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {} {} {}", marker, id, format!("({kinds})").dimmed());
    }

    Ok(())
}
