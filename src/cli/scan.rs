//! Scan command: harvest events backward from a start block

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use starknet_event_harvester::{
    create_writer, BlockId, ConfigFile, EventSource, HarvestConfig, HarvestReport, Harvester,
    MemorySource, OutputFormat, ScanProgress,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args)]
pub struct ScanArgs {
    /// Starknet JSON-RPC URL
    #[arg(long, env = "STARKNET_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Replay events from a JSON dump instead of querying a node (takes precedence over --rpc-url)
    #[arg(long)]
    pub events_file: Option<PathBuf>,

    /// Contract address to harvest from (all contracts if omitted)
    #[arg(short, long)]
    pub contract: Option<String>,

    /// Event signature, e.g. "Transfer(#[key] from: ContractAddress, value: u256)" (repeatable)
    #[arg(short, long = "event", action = clap::ArgAction::Append)]
    pub events: Vec<String>,

    /// Start block number (or "latest")
    #[arg(short, long, default_value = "latest")]
    pub start: BlockId,

    /// Blocks per window
    #[arg(long)]
    pub window_size: Option<u64>,

    /// Maximum windows to scan
    #[arg(long)]
    pub window_count: Option<usize>,

    /// Events per page
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Windows drained in parallel
    #[arg(short = 'n', long)]
    pub concurrency: Option<usize>,

    /// Stop once this many records were decoded
    #[arg(long)]
    pub max_records: Option<usize>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Max retries per request
    #[arg(long)]
    pub retries: Option<u32>,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (json, ndjson, csv)
    #[arg(long, default_value = "json")]
    pub format: OutputFormat,

    /// Sort records by block number instead of window-visit order
    #[arg(long)]
    pub ascending: bool,

    /// Config file (default: ~/.config/event-harvester/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn load_config_file(path: Option<&PathBuf>) -> anyhow::Result<Option<ConfigFile>> {
    match path {
        Some(p) => Ok(Some(ConfigFile::load(p)?)),
        None => match ConfigFile::load_default() {
            Ok(file) => Ok(file),
            Err(e) => {
                tracing::warn!("Ignoring default config file: {}", e);
                Ok(None)
            }
        },
    }
}

fn build_config(args: &ScanArgs) -> anyhow::Result<HarvestConfig> {
    let mut builder = HarvestConfig::builder()
        .events(args.events.iter().cloned())
        .start(args.start);

    if let Some(file) = load_config_file(args.config.as_ref())? {
        builder = builder.file(file);
    }
    if let Some(url) = &args.rpc_url {
        builder = builder.rpc_url(url);
    }
    if let Some(contract) = &args.contract {
        builder = builder.contract(contract);
    }
    if let Some(v) = args.window_size {
        builder = builder.window_size(v);
    }
    if let Some(v) = args.window_count {
        builder = builder.window_count(v);
    }
    if let Some(v) = args.page_size {
        builder = builder.page_size(v);
    }
    if let Some(v) = args.concurrency {
        builder = builder.concurrency(v);
    }
    if let Some(v) = args.max_records {
        builder = builder.max_records(v);
    }
    if let Some(v) = args.timeout {
        builder = builder.timeout_seconds(v);
    }
    if let Some(v) = args.retries {
        builder = builder.retry_attempts(v);
    }

    Ok(builder.build()?)
}

pub async fn handle(args: &ScanArgs, quiet: bool) -> anyhow::Result<()> {
    let config = build_config(args)?;

    match &args.events_file {
        Some(path) => {
            let source = MemorySource::load(path)?;
            if !quiet {
                eprintln!("Replaying {} events from {}", source.len(), path.display());
            }
            run(Harvester::new(source, config.decoder()?), &config, args, quiet).await
        }
        None => {
            let harvester = Harvester::connect(&config)?;
            if !quiet {
                eprintln!("Connecting to {}...", harvester.source().url());
            }
            run(harvester, &config, args, quiet).await
        }
    }
}

async fn run<S: EventSource>(
    harvester: Harvester<S>,
    config: &HarvestConfig,
    args: &ScanArgs,
    quiet: bool,
) -> anyhow::Result<()> {
    // Set up progress bar
    let pb = if !quiet {
        let pb = ProgressBar::new(config.scan.window_count as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} windows ({msg})",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let pb_clone = pb.clone();
    let harvester = harvester.with_progress(move |progress: ScanProgress| {
        if let Some(ref pb) = pb_clone {
            pb.set_length(progress.windows_total as u64);
            pb.set_position(progress.windows_done as u64);
            pb.set_message(format!(
                "block {}, {} records, {:.0} blocks/s",
                progress.current_block, progress.records, progress.blocks_per_second
            ));
        }
    });

    let start = Instant::now();
    let result = harvester.harvest(&config.request()).await;

    if let Some(ref pb) = pb {
        pb.finish_and_clear();
    }

    let mut report = match result {
        Ok(report) => report,
        Err(e) => {
            if let Some(window) = e.failed_window() {
                eprintln!(
                    "Window {} failed; rerun with --start {} to resume from it",
                    window, window.to_block
                );
            }
            return Err(e.into());
        }
    };
    let elapsed = start.elapsed();

    if args.ascending {
        report.sort_ascending();
    }

    let mut writer = create_writer(args.format, args.output.as_deref())?;
    writer.write_report(&report)?;
    writer.finalize()?;

    if !quiet {
        print_summary(&report, elapsed.as_secs_f64());
    }

    Ok(())
}

fn print_summary(report: &HarvestReport, seconds: f64) {
    eprintln!(
        "Harvested {} records from {} windows in {:.2}s",
        report.records.len(),
        report.windows_scanned,
        seconds
    );
    if report.skipped_events() > 0 {
        eprintln!("Skipped {} undecodable events", report.skipped_events());
    }
    for diagnostic in report.diagnostics.iter().take(10) {
        eprintln!("  {}", diagnostic);
    }
    if report.diagnostics.len() > 10 {
        eprintln!("  ... and {} more", report.diagnostics.len() - 10);
    }
    if report.reached_genesis {
        eprintln!("Reached genesis");
    } else if report.stopped_by_budget {
        eprintln!("Stopped at the record budget");
    } else if let Some(lowest) = report.lowest_block {
        eprintln!("Lowest block scanned: {}", lowest);
    }
}
