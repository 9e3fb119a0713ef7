//! Scan plan preview

use clap::Args;
use starknet_event_harvester::WindowPlan;

#[derive(Args)]
pub struct WindowsArgs {
    /// Block the scan starts from
    pub start: u64,

    /// Blocks per window
    pub window_size: u64,

    /// Maximum windows
    pub window_count: usize,
}

pub fn handle(args: &WindowsArgs, quiet: bool) -> anyhow::Result<()> {
    if args.window_size == 0 {
        anyhow::bail!("window size must be greater than zero");
    }

    let plan = WindowPlan::new(args.start, args.window_size, args.window_count);
    let mut last = None;
    for window in plan {
        println!("{}", window);
        last = Some(window);
    }

    if !quiet {
        match last {
            Some(w) if w.reaches_genesis() => eprintln!("Plan reaches genesis"),
            Some(w) => eprintln!("Plan stops at block {}", w.from_block),
            None => eprintln!("Empty plan"),
        }
    }

    Ok(())
}
