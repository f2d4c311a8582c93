//! Dump command implementation

use anyhow::Result;
use clap::Args;
use propconf::LayeredConfiguration;

#[derive(Args)]
pub struct DumpArgs {
    /// Emit JSON with resolved value, raw value and origin per key
    #[arg(long)]
    pub json: bool,
}

pub fn run(config: &LayeredConfiguration, args: DumpArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&config.describe())?);
    } else {
        let dump = config.dump();
        if !dump.is_empty() {
            println!("{}", dump);
        }
    }
    Ok(())
}
