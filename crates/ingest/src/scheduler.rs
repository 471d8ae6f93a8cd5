//! Periodic ingestion.
//!
//! The job runs once right away and then on a fixed interval until the
//! returned handle is shut down. Each finished attempt is also sent to the
//! caller through a channel.

use std::sync::Arc;
use std::time::Duration;

use buddybot_core::ingest::LoadingAttempt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::job::IngestionJob;

pub struct IngestionScheduler {
    job: Arc<IngestionJob>,
    interval: Duration,
}

/// Stops a running scheduler.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<usize>,
}

impl SchedulerHandle {
    /// Signal shutdown and wait for the loop to exit.
    ///
    /// A run already in progress is allowed to finish. Returns the number of
    /// runs performed.
    pub async fn shutdown(self) -> usize {
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(runs) => runs,
            Err(e) => {
                error!(error = %e, "Ingestion scheduler task failed");
                0
            }
        }
    }
}

impl IngestionScheduler {
    pub fn new(job: Arc<IngestionJob>, interval: Duration) -> Self {
        Self { job, interval }
    }

    pub fn every_minutes(job: Arc<IngestionJob>, minutes: u64) -> Self {
        Self::new(job, Duration::from_secs(minutes.max(1) * 60))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the background loop.
    pub fn start(&self) -> (mpsc::Receiver<LoadingAttempt>, SchedulerHandle) {
        let job = self.job.clone();
        let period = self.interval;
        let (tx, rx) = mpsc::channel::<LoadingAttempt>(16);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        info!(interval_secs = period.as_secs(), "Ingestion scheduler started");

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut runs = 0usize;

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = shutdown_rx.changed() => break,
                }

                runs += 1;
                debug!(run = runs, "Ingestion tick");
                match job.run().await {
                    Ok(attempt) => {
                        // Nobody listening is fine; keep ingesting.
                        let _ = tx.send(attempt).await;
                    }
                    Err(e) => error!(error = %e, "Ingestion run failed"),
                }

                if *shutdown_rx.borrow() {
                    break;
                }
            }

            info!(runs, "Ingestion scheduler stopped");
            runs
        });

        (
            rx,
            SchedulerHandle {
                shutdown: shutdown_tx,
                task,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddybot_core::store::LoadLogStore;
    use buddybot_memory::{HashingEmbedder, InMemoryHistory, InMemoryIndex};

    fn job(history: Arc<InMemoryHistory>) -> Arc<IngestionJob> {
        let index = Arc::new(InMemoryIndex::new(Arc::new(HashingEmbedder::default())));
        Arc::new(IngestionJob::new(vec![], index, history, 100))
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_on_interval() {
        let history = Arc::new(InMemoryHistory::new());
        let scheduler = IngestionScheduler::every_minutes(job(history.clone()), 60);
        let (mut rx, handle) = scheduler.start();

        let first = rx.recv().await.unwrap();
        assert!(first.outcome);

        // Paused time auto-advances to the next tick.
        let second = rx.recv().await.unwrap();
        assert!(second.started_at >= first.started_at);

        let runs = handle.shutdown().await;
        assert!(runs >= 2);
        assert!(history.last_outcome().await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_before_next_tick() {
        let scheduler = IngestionScheduler::every_minutes(job(Arc::new(InMemoryHistory::new())), 1440);
        let (mut rx, handle) = scheduler.start();
        rx.recv().await.unwrap();
        assert_eq!(handle.shutdown().await, 1);
    }

    #[test]
    fn zero_minutes_clamps_to_one() {
        let scheduler = IngestionScheduler::every_minutes(job(Arc::new(InMemoryHistory::new())), 0);
        assert_eq!(scheduler.interval(), Duration::from_secs(60));
    }
}
