use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "steward")]
#[command(version)]
#[command(about = "Resolve which provider manages each declared resource", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve a resource declaration to its provider
    Resolve(ResolveArgs),

    /// Show the service-management subsystems this host runs
    Probe(ProbeArgs),

    /// List registered provider variants
    Providers(ProvidersArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct ResolveArgs {
    /// Resource type (service, file, package, ...)
    pub kind: String,

    /// Resource name, e.g. the service name or file path
    pub name: String,

    /// Requested action
    #[arg(short, long, default_value = "start")]
    pub action: String,

    /// Explicit provider override, skipping resolution
    #[arg(short, long)]
    pub provider: Option<String>,

    /// TOML file with host facts to resolve against instead of this host
    #[arg(long)]
    pub facts: Option<PathBuf>,

    /// Emit the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ProbeArgs {
    /// Also show which subsystems this service is configured for
    pub service: Option<String>,

    /// Emit the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ProvidersArgs {
    /// Only list variants implementing this resource type
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Emit the result as JSON
    #[arg(long)]
    pub json: bool,
}
