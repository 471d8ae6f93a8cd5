//! `buddybot schedule`: Periodic ingestion until Ctrl+C.

use std::sync::Arc;

use buddybot_ingest::IngestionScheduler;
use tracing::{info, warn};

use super::{CmdResult, Runtime};

pub async fn run(runtime: &Runtime, interval_minutes: Option<u64>) -> CmdResult {
    let minutes = interval_minutes.unwrap_or(runtime.config.ingestion.interval_minutes);
    let job = Arc::new(runtime.ingestion_job());

    println!("BuddyBot ingestion scheduler");
    println!("   Sources:  {}", job.items().len());
    println!("   Interval: {minutes} min");
    println!("   Press Ctrl+C to stop.");

    let scheduler = IngestionScheduler::every_minutes(job, minutes);
    let (mut attempts, handle) = scheduler.start();

    loop {
        tokio::select! {
            attempt = attempts.recv() => match attempt {
                Some(attempt) => print!("{}", attempt.summary()),
                None => {
                    warn!("Scheduler stopped unexpectedly");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    let runs = handle.shutdown().await;
    println!("Stopped after {runs} run(s).");
    Ok(())
}
