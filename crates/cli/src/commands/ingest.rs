//! `buddybot ingest`: Run the ingestion job once.

use tracing::warn;

use super::{CmdResult, Runtime};

pub async fn run(runtime: &Runtime) -> CmdResult {
    let job = runtime.ingestion_job();
    if job.items().is_empty() {
        warn!("No ingestion sources configured; the index will be emptied");
    }

    let attempt = job.run().await?;
    print!("{}", attempt.summary());

    if !attempt.outcome {
        return Err("Ingestion finished with failures".into());
    }
    Ok(())
}
