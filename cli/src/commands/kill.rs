//! Kill command - terminate processes by PID.

use std::collections::HashSet;

use anyhow::{anyhow, Result};
use portscope_core::{adapters::SignalKiller, Config, TerminationSummary, Terminator};

pub async fn run(mut pids: Vec<u32>, force: bool, config: &Config) -> Result<()> {
    let mut seen = HashSet::new();
    pids.retain(|pid| seen.insert(*pid));

    let force = force || config.kill_mode.is_force();
    let terminator = Terminator::new(SignalKiller::with_grace_period(config.grace_period()), force);

    if force {
        println!("Force killing {} process(es)...", pids.len());
    } else {
        println!("Killing {} process(es)...", pids.len());
    }

    let summary = terminator.terminate(&pids).await;
    println!(
        "Killed {} of {} process(es)",
        summary.succeeded, summary.requested
    );

    into_result(summary)
}

fn into_result(summary: TerminationSummary) -> Result<()> {
    let failed = summary.failed();
    match summary.first_error {
        None => Ok(()),
        Some(e) => Err(anyhow!(e).context(format!("{} process(es) could not be killed", failed))),
    }
}
