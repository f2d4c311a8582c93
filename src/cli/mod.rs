//! Command-line interface for propconf
//!
//! Loads the layered configuration the same way an application would and
//! provides `get`, `keys`, `dump` and `subset` subcommands to inspect it.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use propconf::{EnvironmentContext, LayeredConfiguration};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod dump;
mod get;
mod keys;
mod subset;
mod utils;

use utils::parse_csv;

/// Inspect layered property-file configuration
#[derive(Parser)]
#[command(name = "propconf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    load: LoadArgs,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// How to locate and overlay the configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct LoadArgs {
    /// Directory to search for resources (repeatable, defaults to the current directory)
    #[arg(long = "root", value_name = "DIR", global = true)]
    pub roots: Vec<PathBuf>,

    /// Resources to load, in order (comma-separated); replaces the bootstrap order
    #[arg(short = 'r', long, value_name = "NAMES", global = true)]
    pub resources: Option<String>,

    /// Environment suffix applied to lookups
    #[arg(short, long, value_name = "SUFFIX", env = "PROPCONF_ENVIRONMENT", global = true)]
    pub env: Option<String>,
}

impl LoadArgs {
    pub fn load(&self) -> Result<LayeredConfiguration> {
        let environment = match self.env.as_deref() {
            Some(suffix) => EnvironmentContext::with_suffix(suffix),
            None => EnvironmentContext::new(),
        };
        let mut builder = LayeredConfiguration::builder().environment(environment);
        for root in &self.roots {
            builder = builder.search_root(root);
        }
        if let Some(resources) = parse_csv(&self.resources) {
            builder = builder.resources(resources);
        }
        builder.build().context("Failed to load configuration")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved value of a key
    Get(get::GetArgs),

    /// List the merged keys
    Keys(keys::KeysArgs),

    /// Print every merged key with its value and origin
    Dump(dump::DumpArgs),

    /// Print the keys under a prefix
    Subset(subset::SubsetArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let config = cli.load.load()?;
    match cli.command {
        Commands::Get(args) => get::run(&config, args),
        Commands::Keys(args) => keys::run(&config, args),
        Commands::Dump(args) => dump::run(&config, args),
        Commands::Subset(args) => subset::run(&config, args),
    }
}
