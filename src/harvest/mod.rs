//! Backward event harvest over a Starknet-style ledger
//!
//! [`Harvester`] is the entry point: it pins `latest` to a concrete height once, builds the
//! topic filter from its decoders, and runs a [`WindowScanner`] over the resulting plan.

mod pager;
mod report;
mod scanner;
mod window;

pub use pager::EventPager;
pub use report::{Diagnostic, DiagnosticKind, HarvestReport, WindowOutcome};
pub use scanner::{decode_window, ProgressCallback, ScanOptions, ScanProgress, WindowScanner};
pub use window::{ScanWindow, WindowPlan};

use crate::config::{validate_scan, HarvestConfig};
use crate::decode::LogDecoder;
use crate::error::{ConfigError, Result};
use crate::felt::Felt;
use crate::ledger::{BlockId, EventFilter, EventSource, RpcEndpoint};

/// What to harvest and how far back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestRequest {
    /// Emitting contract; `None` matches every contract
    pub contract: Option<Felt>,
    pub start: BlockId,
    pub options: ScanOptions,
}

impl HarvestRequest {
    pub fn new(start: BlockId) -> Self {
        Self {
            contract: None,
            start,
            options: ScanOptions::default(),
        }
    }

    pub fn contract(mut self, address: Felt) -> Self {
        self.contract = Some(address);
        self
    }

    pub fn options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }
}

/// Ledger source plus the decoders to apply
pub struct Harvester<S> {
    source: S,
    decoder: LogDecoder,
    progress_callback: Option<ProgressCallback>,
}

impl Harvester<RpcEndpoint> {
    /// Harvester over the configured RPC endpoint
    pub fn connect(config: &HarvestConfig) -> Result<Self> {
        let endpoint = config.endpoint()?.connect()?;
        tracing::info!("Using RPC endpoint {}", endpoint.url());
        Ok(Self::new(endpoint, config.decoder()?))
    }
}

impl<S: EventSource> Harvester<S> {
    pub fn new(source: S, decoder: LogDecoder) -> Self {
        Self {
            source,
            decoder,
            progress_callback: None,
        }
    }

    /// Set progress callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ScanProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn decoder(&self) -> &LogDecoder {
        &self.decoder
    }

    /// Pin a start block to a concrete height
    pub async fn resolve_start(&self, start: BlockId) -> Result<u64> {
        match start {
            BlockId::Number(n) => Ok(n),
            BlockId::Latest => {
                let head = self.source.block_number().await?;
                tracing::debug!("Resolved latest block to {}", head);
                Ok(head)
            }
        }
    }

    /// Ledger filter for a request: registered selectors in `keys[0]`, optional emitter
    pub fn filter(&self, request: &HarvestRequest) -> EventFilter {
        let filter = EventFilter::new().selectors(self.decoder.selectors());
        match request.contract {
            Some(address) => filter.address(address),
            None => filter,
        }
    }

    /// Scanner bound to this harvester's source and decoders
    pub fn scanner(&self, request: &HarvestRequest) -> WindowScanner<'_, S> {
        let scanner = WindowScanner::new(
            &self.source,
            &self.decoder,
            self.filter(request),
            request.options.clone(),
        );
        match &self.progress_callback {
            Some(cb) => scanner.with_progress(cb),
            None => scanner,
        }
    }

    /// Run a full harvest
    pub async fn harvest(&self, request: &HarvestRequest) -> Result<HarvestReport> {
        if self.decoder.is_empty() {
            return Err(ConfigError::MissingField("event signature".into()).into());
        }
        validate_scan(&request.options)?;

        let start_block = self.resolve_start(request.start).await?;
        self.scanner(request).scan(start_block).await
    }
}
