//! Backward window scan with per-event decoding

use super::pager::EventPager;
use super::report::{Diagnostic, HarvestReport, WindowOutcome};
use super::window::{ScanWindow, WindowPlan};
use crate::decode::LogDecoder;
use crate::error::Result;
use crate::ledger::{EventFilter, EventSource, RawEvent};
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use std::pin::pin;
use std::time::Instant;

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(ScanProgress) + Send + Sync>;

/// Scan progress information
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Windows fully drained so far
    pub windows_done: usize,
    /// Windows in the plan
    pub windows_total: usize,
    /// Lower bound of the last finished window
    pub current_block: u64,
    /// Records decoded so far
    pub records: usize,
    /// Diagnostics recorded so far
    pub diagnostics: usize,
    /// Blocks per second
    pub blocks_per_second: f64,
}

/// Scan tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Blocks per window
    pub window_size: u64,
    /// Maximum windows to visit
    pub window_count: usize,
    /// `chunk_size` of each page query
    pub page_size: u64,
    /// Windows drained at once; pages inside a window are always sequential
    pub concurrency: usize,
    /// Stop consuming windows once this many records were decoded
    pub max_records: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            window_size: 1_000,
            window_count: 10,
            page_size: 100,
            concurrency: 1,
            max_records: None,
        }
    }
}

/// Walks history backward one window at a time
pub struct WindowScanner<'a, S> {
    source: &'a S,
    decoder: &'a LogDecoder,
    filter: EventFilter,
    options: ScanOptions,
    progress_callback: Option<&'a ProgressCallback>,
}

impl<'a, S: EventSource> WindowScanner<'a, S> {
    pub fn new(
        source: &'a S,
        decoder: &'a LogDecoder,
        filter: EventFilter,
        options: ScanOptions,
    ) -> Self {
        Self {
            source,
            decoder,
            filter,
            options,
            progress_callback: None,
        }
    }

    /// Set progress callback
    pub fn with_progress(mut self, callback: &'a ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Window plan starting at `start_block`
    pub fn plan(&self, start_block: u64) -> WindowPlan {
        WindowPlan::new(start_block, self.options.window_size, self.options.window_count)
    }

    /// Drain and decode a single window
    pub async fn scan_window(&self, window: ScanWindow) -> Result<WindowOutcome> {
        let pager = EventPager::new(self.source, &self.filter, self.options.page_size);
        let events = pager.drain_window(window).await?;
        Ok(decode_window(self.decoder, window, events))
    }

    /// One outcome per window, in plan order
    ///
    /// Up to `concurrency` windows are in flight, but outcomes are yielded by window index.
    /// Dropping the stream abandons in-flight windows without emitting any part of them.
    pub fn scan_stream(
        &'a self,
        plan: WindowPlan,
    ) -> impl Stream<Item = Result<WindowOutcome>> + 'a {
        stream::iter(plan)
            .map(move |window| self.scan_window(window))
            .buffered(self.options.concurrency.max(1))
    }

    /// Scan the whole plan and aggregate
    ///
    /// A window that fails to drain aborts the scan with the failing bounds attached; use
    /// [`WindowScanner::scan_stream`] to keep the windows finished before it.
    pub async fn scan(&self, start_block: u64) -> Result<HarvestReport> {
        let plan = self.plan(start_block);
        let windows_total = plan.len();
        let started = Instant::now();

        tracing::info!(
            "Scanning {} windows of {} blocks back from block {}",
            windows_total,
            self.options.window_size,
            start_block
        );

        let mut report = HarvestReport::new(start_block);
        let mut outcomes = pin!(self.scan_stream(plan));

        while let Some(outcome) = outcomes.try_next().await? {
            tracing::debug!(
                "Window {}: {} events, {} records, {} diagnostics",
                outcome.window,
                outcome.raw_events,
                outcome.records.len(),
                outcome.diagnostics.len()
            );
            report.absorb(outcome);

            if let Some(cb) = self.progress_callback {
                let blocks_done = start_block - report.lowest_block.unwrap_or(start_block) + 1;
                let elapsed = started.elapsed().as_secs_f64();
                cb(ScanProgress {
                    windows_done: report.windows_scanned,
                    windows_total,
                    current_block: report.lowest_block.unwrap_or(start_block),
                    records: report.records.len(),
                    diagnostics: report.diagnostics.len(),
                    blocks_per_second: if elapsed > 0.0 {
                        blocks_done as f64 / elapsed
                    } else {
                        0.0
                    },
                });
            }

            if let Some(max) = self.options.max_records {
                if report.records.len() >= max {
                    tracing::info!("Record budget of {} reached", max);
                    report.stopped_by_budget = true;
                    break;
                }
            }
        }

        tracing::info!(
            "Scanned {} windows: {} records, {} diagnostics",
            report.windows_scanned,
            report.records.len(),
            report.diagnostics.len()
        );

        Ok(report)
    }
}

/// Decode a drained window; failures become diagnostics, never errors
pub fn decode_window(
    decoder: &LogDecoder,
    window: ScanWindow,
    events: Vec<RawEvent>,
) -> WindowOutcome {
    let raw_events = events.len();
    let mut records = Vec::with_capacity(raw_events);
    let mut diagnostics = Vec::new();

    for (index, event) in events.iter().enumerate() {
        match decoder.decode(event) {
            Ok(decoded) => {
                diagnostics.extend(
                    decoded
                        .lossy
                        .iter()
                        .map(|(field, fragment)| Diagnostic::lossy(event, index, field, fragment)),
                );
                records.push(decoded.record);
            }
            Err(e) => {
                tracing::warn!(
                    "Skipping event in block {} tx {}: {}",
                    event.block_number,
                    event.transaction_hash,
                    e
                );
                diagnostics.push(Diagnostic::skipped(event, index, &e));
            }
        }
    }

    WindowOutcome {
        window,
        raw_events,
        records,
        diagnostics,
    }
}
