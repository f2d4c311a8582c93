//! Get command implementation

use anyhow::{bail, Result};
use clap::Args;
use propconf::{Configuration, LayeredConfiguration};

#[derive(Args)]
pub struct GetArgs {
    /// Key to resolve
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Print the value without expanding placeholders
    #[arg(long)]
    pub raw: bool,

    /// Also print the source that supplied the value
    #[arg(long)]
    pub origin: bool,
}

pub fn run(config: &LayeredConfiguration, args: GetArgs) -> Result<()> {
    let value = if args.raw { config.get_raw(&args.key) } else { config.get(&args.key) };
    let Some(value) = value else {
        bail!("Key not found: {}", args.key);
    };

    if args.origin {
        println!("{} [{}]", value, config.origin(&args.key).unwrap_or_default());
    } else {
        println!("{}", value);
    }
    Ok(())
}
