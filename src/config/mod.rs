//! Harvest configuration
//!
//! Values resolve in this order: builder calls (CLI flags), then the config file, then defaults.

mod endpoint;
mod file;

pub use endpoint::EndpointConfig;
pub use file::{ConfigFile, Settings};

use crate::decode::LogDecoder;
use crate::error::{ConfigError, Result};
use crate::felt::Felt;
use crate::harvest::{HarvestRequest, ScanOptions};
use crate::ledger::BlockId;

/// Environment variable holding the RPC URL
pub const RPC_URL_ENV: &str = "STARKNET_RPC_URL";

/// Validated harvest configuration
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// `None` when no URL was configured; offline replay needs none
    pub endpoint: Option<EndpointConfig>,
    /// Emitting contract; `None` harvests every contract
    pub contract: Option<Felt>,
    /// Event signatures, one decoder each
    pub events: Vec<String>,
    pub start: BlockId,
    pub scan: ScanOptions,
}

impl HarvestConfig {
    pub fn builder() -> HarvestConfigBuilder {
        HarvestConfigBuilder::default()
    }

    /// The configured endpoint, or an error naming where a URL can come from
    pub fn endpoint(&self) -> Result<&EndpointConfig> {
        self.endpoint.as_ref().ok_or_else(|| {
            ConfigError::MissingField(format!("rpc_url (or {})", RPC_URL_ENV)).into()
        })
    }

    /// Decoder registry for the configured events
    pub fn decoder(&self) -> Result<LogDecoder> {
        Ok(LogDecoder::from_signatures(&self.events)?)
    }

    /// The request this configuration describes
    pub fn request(&self) -> HarvestRequest {
        HarvestRequest {
            contract: self.contract,
            start: self.start,
            options: self.scan.clone(),
        }
    }
}

/// Builder for [`HarvestConfig`]
#[derive(Debug, Clone, Default)]
pub struct HarvestConfigBuilder {
    rpc_url: Option<String>,
    contract: Option<String>,
    events: Vec<String>,
    start: Option<BlockId>,
    window_size: Option<u64>,
    window_count: Option<usize>,
    page_size: Option<u64>,
    concurrency: Option<usize>,
    max_records: Option<usize>,
    timeout_seconds: Option<u64>,
    retry_attempts: Option<u32>,
    file: Option<ConfigFile>,
}

impl HarvestConfigBuilder {
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Contract address as hex
    pub fn contract(mut self, address: impl Into<String>) -> Self {
        self.contract = Some(address.into());
        self
    }

    /// Add an event signature
    pub fn event(mut self, signature: impl Into<String>) -> Self {
        self.events.push(signature.into());
        self
    }

    pub fn events<I, S>(mut self, signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events.extend(signatures.into_iter().map(Into::into));
        self
    }

    pub fn start(mut self, start: BlockId) -> Self {
        self.start = Some(start);
        self
    }

    pub fn window_size(mut self, blocks: u64) -> Self {
        self.window_size = Some(blocks);
        self
    }

    pub fn window_count(mut self, count: usize) -> Self {
        self.window_count = Some(count);
        self
    }

    pub fn page_size(mut self, size: u64) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn concurrency(mut self, windows: usize) -> Self {
        self.concurrency = Some(windows);
        self
    }

    pub fn max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }

    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = Some(attempts);
        self
    }

    /// Fall back to a config file for anything not set explicitly
    pub fn file(mut self, file: ConfigFile) -> Self {
        self.file = Some(file);
        self
    }

    pub fn build(self) -> Result<HarvestConfig> {
        let file = self.file.unwrap_or_default();
        let settings = &file.settings;

        let url = self.rpc_url.or(file.rpc_url.clone());

        let events = if self.events.is_empty() {
            file.events.clone()
        } else {
            self.events
        };
        if events.is_empty() {
            return Err(ConfigError::MissingField("event signature".into()).into());
        }
        // Reject bad signatures before any network traffic
        LogDecoder::from_signatures(&events)?;

        let contract = self
            .contract
            .map(|c| {
                Felt::from_hex(&c)
                    .map_err(|e| ConfigError::InvalidAddress(format!("{}: {}", c, e)))
            })
            .transpose()?;

        let scan = ScanOptions {
            window_size: self.window_size.unwrap_or(settings.window_size),
            window_count: self.window_count.unwrap_or(settings.window_count),
            page_size: self.page_size.unwrap_or(settings.page_size),
            concurrency: self.concurrency.unwrap_or(settings.concurrency),
            max_records: self.max_records,
        };
        validate_scan(&scan)?;

        let endpoint = url.map(|url| {
            EndpointConfig::new(url)
                .with_timeout(self.timeout_seconds.unwrap_or(settings.timeout_seconds))
                .with_retries(self.retry_attempts.unwrap_or(settings.retry_attempts))
        });

        Ok(HarvestConfig {
            endpoint,
            contract,
            events,
            start: self.start.unwrap_or_default(),
            scan,
        })
    }
}

/// Reject scan options that cannot make progress
pub fn validate_scan(scan: &ScanOptions) -> std::result::Result<(), ConfigError> {
    let positive = [
        ("window_size", scan.window_size as u128),
        ("window_count", scan.window_count as u128),
        ("page_size", scan.page_size as u128),
        ("concurrency", scan.concurrency as u128),
    ];
    for (field, value) in positive {
        if value == 0 {
            return Err(ConfigError::InvalidValue {
                field: field.into(),
                reason: "must be greater than zero".into(),
            });
        }
    }
    if scan.max_records == Some(0) {
        return Err(ConfigError::InvalidValue {
            field: "max_records".into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(())
}
