//! Event selector command

use clap::Args;
use starknet_event_harvester::{selector_for, EventSignature};

#[derive(Args)]
pub struct SelectorArgs {
    /// Event names (e.g. Transfer) or full signatures (e.g. "Transfer(from: ContractAddress, ...)")
    #[arg(required = true)]
    pub names: Vec<String>,
}

pub fn handle(args: &SelectorArgs, quiet: bool) -> anyhow::Result<()> {
    for name in &args.names {
        if name.contains('(') {
            let signature = EventSignature::parse(name)?;
            if quiet {
                println!("{}", signature.selector);
            } else {
                println!("{}  {}", signature.selector, signature);
            }
        } else {
            println!("{}", selector_for(name.trim()));
        }
    }

    Ok(())
}
