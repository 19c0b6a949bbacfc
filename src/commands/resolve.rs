//! `steward resolve` - run the resolver for one declaration

use crate::cli::ResolveArgs;
use crate::providers;
use anyhow::{Result, bail};
use colored::Colorize;
use convergence::{
    Action, HostProbe, ProviderResolver, ResourceDeclaration, ResourceKind, SystemRunner,
};
use serde_json::json;
use std::sync::Arc;

pub fn run(args: ResolveArgs) -> Result<()> {
    let kind: ResourceKind = args.kind.parse()?;
    let action: Action = args.action.parse()?;
    let facts = super::host_facts(args.facts.as_deref())?;

    let registry = Arc::new(providers::registry()?);

    let mut resource = ResourceDeclaration::new(kind, &args.name);
    if let Some(name) = &args.provider {
        let Some(id) = registry.find(name) else {
            bail!("unknown provider `{name}`; run `steward providers` to list them");
        };
        resource = resource.with_provider(id);
    }

    let runner = Arc::new(SystemRunner::new());
    let probe = Arc::new(HostProbe::new(runner.clone()));
    let resolver = ProviderResolver::new(
        registry,
        providers::fallback_table(),
        providers::platform_table(),
        Arc::new(facts),
        probe,
        runner,
    );

    let provider = resolver.resolve(&resource, action)?;

    if args.json {
        let out = json!({
            "resource": { "kind": kind, "name": args.name },
            "action": action,
            "provider": provider.variant(),
            "description": provider.describe(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "{} {}[{}] {} {}",
            "✓".green(),
            kind,
            args.name,
            "→".dimmed(),
            provider.variant().to_string().bold()
        );
        println!("  {}: {}", "would".dimmed(), provider.describe());
    }

    Ok(())
}
