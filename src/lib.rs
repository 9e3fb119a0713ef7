//! starknet-event-harvester - Backward event harvester for Starknet
//!
//! Walks block history backward from a start block in fixed-size windows, drains each window
//! through `starknet_getEvents` continuation tokens, and decodes event payloads (packed
//! `ByteArray` strings, split `u256` integers, addresses, small integers) into records.
//! Events that fail to decode are reported as diagnostics and never abort the harvest.
//!
//! # Example
//!
//! ```rust,no_run
//! use starknet_event_harvester::{BlockId, HarvestConfig, Harvester};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HarvestConfig::builder()
//!         .rpc_url("https://starknet-mainnet.public.blastapi.io/rpc/v0_7")
//!         .contract("0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7")
//!         .event("TokenMinted(collection_id: u256, token_id: u256, token_uri: ByteArray)")
//!         .start(BlockId::Latest)
//!         .window_size(1_000)
//!         .window_count(20)
//!         .build()?;
//!
//!     let harvester = Harvester::connect(&config)?;
//!     let report = harvester.harvest(&config.request()).await?;
//!
//!     println!(
//!         "{} records, {} skipped",
//!         report.records.len(),
//!         report.skipped_events()
//!     );
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod felt;
pub mod harvest;
pub mod ledger;
pub mod output;

// Re-exports for convenience
pub use config::{ConfigFile, EndpointConfig, HarvestConfig, HarvestConfigBuilder, Settings};
pub use decode::{
    decode_byte_array, decode_u256, selector_for, DecodedRecord, DecodedValue, EventDecoder,
    EventSignature, FeltCursor, LogDecoder,
};
pub use error::{ConfigError, DecodeError, Error, OutputError, Result, RpcError};
pub use felt::Felt;
pub use harvest::{
    Diagnostic, DiagnosticKind, HarvestReport, HarvestRequest, Harvester, ScanOptions,
    ScanProgress, ScanWindow, WindowPlan, WindowScanner,
};
pub use ledger::{BlockId, EventFilter, EventSource, MemorySource, RawEvent, RpcEndpoint};
pub use output::{create_writer, CsvWriter, JsonWriter, OutputFormat, OutputWriter};
