//! Keys command implementation

use anyhow::Result;
use clap::Args;
use propconf::{Configuration, LayeredConfiguration};

#[derive(Args)]
pub struct KeysArgs {
    /// Only list keys starting with this prefix
    #[arg(short, long, value_name = "PREFIX")]
    pub prefix: Option<String>,
}

pub fn run(config: &LayeredConfiguration, args: KeysArgs) -> Result<()> {
    let prefix = args.prefix.unwrap_or_default();
    for key in config.keys().into_iter().filter(|key| key.starts_with(&prefix)) {
        println!("{}", key);
    }
    Ok(())
}
