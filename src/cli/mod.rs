//! CLI command modules
//!
//! Each subcommand has its own module with argument definitions and handlers.

pub mod config;
pub mod decode;
pub mod scan;
pub mod selector;
pub mod windows;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "event-harvester")]
#[command(
    version,
    about = "Backward event harvester for Starknet: windowed scans, paginated drains, payload decoding"
)]
#[command(after_help = r#"EXAMPLES:
    # Harvest mint events from the last 20,000 blocks
    event-harvester scan -c 0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7 \
        -e "TokenMinted(collection_id: u256, token_id: u256, token_uri: ByteArray)" \
        --window-size 1000 --window-count 20 -o mints.json

    # Replay a saved starknet_getEvents dump offline
    event-harvester scan --events-file events.json -e "Ping(id: u64)" --start 5000

    # Decode a packed ByteArray
    event-harvester decode byte-array 0x0 0x41 0x1

    # Recombine a u256 from its (low, high) halves
    event-harvester decode u256 0x5 0x0

    # Event selector
    event-harvester selector Transfer

    # Preview a scan plan
    event-harvester windows 1000 300 4

ENVIRONMENT VARIABLES:
    STARKNET_RPC_URL    Starknet JSON-RPC endpoint

CONFIG FILE:
    Default: ~/.config/event-harvester/config.toml
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest events walking backward from a start block
    Scan(Box<scan::ScanArgs>),

    /// Decode raw payload words
    Decode {
        #[command(subcommand)]
        action: decode::DecodeCommands,
    },

    /// Compute event selectors from names or signatures
    Selector(selector::SelectorArgs),

    /// Print the windows a scan would visit
    Windows(windows::WindowsArgs),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: config::ConfigCommands,
    },
}
