//! Subset command implementation

use anyhow::Result;
use clap::Args;
use propconf::LayeredConfiguration;

use super::utils::key_value_lines;

#[derive(Args)]
pub struct SubsetArgs {
    /// Key prefix to select
    #[arg(value_name = "PREFIX")]
    pub prefix: String,

    /// Strip the prefix from the printed keys
    #[arg(short, long)]
    pub truncate: bool,

    /// Emit a JSON object instead of key=value lines
    #[arg(long)]
    pub json: bool,
}

pub fn run(config: &LayeredConfiguration, args: SubsetArgs) -> Result<()> {
    let entries = config.get_sub_properties(&args.prefix, args.truncate);
    if args.json {
        println!("{}", serde_json::to_string_pretty(entries.as_ref())?);
    } else if !entries.is_empty() {
        println!("{}", key_value_lines(entries.iter()));
    }
    Ok(())
}
