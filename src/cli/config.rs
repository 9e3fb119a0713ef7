//! Configuration management commands

use clap::Subcommand;
use starknet_event_harvester::ConfigFile;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show config file path
    Path,

    /// Set the default RPC URL
    SetRpc {
        /// Starknet JSON-RPC URL
        url: String,
    },

    /// Show current config
    Show,
}

pub fn handle(action: &ConfigCommands) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Path => {
            println!("{}", ConfigFile::default_path().display());
        }

        ConfigCommands::SetRpc { url } => {
            let path = ConfigFile::default_path();
            let mut config = ConfigFile::load_default()?.unwrap_or_default();
            config.rpc_url = Some(url.clone());
            config.save(&path)?;
            println!("RPC URL saved to {}", path.display());
        }

        ConfigCommands::Show => match ConfigFile::load_default()? {
            Some(config) => print!("{}", config.to_toml()?),
            None => {
                println!("No config file at {}", ConfigFile::default_path().display());
                println!("Defaults:");
                print!("{}", ConfigFile::default().to_toml()?);
            }
        },
    }

    Ok(())
}
