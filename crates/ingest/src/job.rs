//! One ingestion run: fetch, clean, chunk, sync, audit.

use std::sync::Arc;

use buddybot_config::AppConfig;
use buddybot_core::document::Document;
use buddybot_core::ingest::{LoadingAttempt, LoadingItem, PlatformLog};
use buddybot_core::store::{LoadLogStore, PlatformSource, VectorIndex};
use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use crate::chunker;
use crate::cleaner::clean_wiki_pages;
use crate::sources::JsonExportSource;

pub struct IngestionJob {
    sources: Vec<Arc<dyn PlatformSource>>,
    index: Arc<dyn VectorIndex>,
    log_store: Arc<dyn LoadLogStore>,
    max_chunk_size: usize,
}

impl IngestionJob {
    pub fn new(
        sources: Vec<Arc<dyn PlatformSource>>,
        index: Arc<dyn VectorIndex>,
        log_store: Arc<dyn LoadLogStore>,
        max_chunk_size: usize,
    ) -> Self {
        Self {
            sources,
            index,
            log_store,
            max_chunk_size,
        }
    }

    /// One [`JsonExportSource`] per configured source.
    pub fn from_config(
        config: &AppConfig,
        index: Arc<dyn VectorIndex>,
        log_store: Arc<dyn LoadLogStore>,
    ) -> Self {
        let sources = config
            .ingestion
            .sources
            .iter()
            .map(|s| Arc::new(JsonExportSource::from_config(s)) as Arc<dyn PlatformSource>)
            .collect();
        Self::new(sources, index, log_store, config.ingestion.max_chunk_size)
    }

    pub fn items(&self) -> Vec<LoadingItem> {
        self.sources.iter().map(|s| s.item()).collect()
    }

    /// Run the job once and record the attempt.
    ///
    /// A failing source only marks its own log as failed; the documents from
    /// the others are still indexed. The only error returned is a failure to
    /// persist the attempt.
    pub async fn run(&self) -> buddybot_core::Result<LoadingAttempt> {
        let started_at = Utc::now();
        info!(sources = self.sources.len(), "Ingestion started");

        let fetched = join_all(self.sources.iter().map(|source| async move {
            (source.item(), source.fetch().await)
        }))
        .await;

        let mut platform_logs = Vec::with_capacity(fetched.len());
        let mut documents: Vec<Document> = Vec::new();

        for (item, result) in fetched {
            match result {
                Ok(docs) => {
                    info!(item = %item, count = docs.len(), "Fetched");
                    let docs = if item == LoadingItem::ConfluencePages {
                        clean_wiki_pages(docs)
                    } else {
                        docs
                    };
                    documents.extend(docs);
                    platform_logs.push(PlatformLog::new(item, true));
                }
                Err(e) => {
                    warn!(item = %item, error = %e, "Fetch failed");
                    platform_logs.push(PlatformLog::new(item, false));
                }
            }
        }

        let chunks = chunker::split(documents, self.max_chunk_size);
        let vector_store_log = self.index.sync(chunks).await;

        let attempt = LoadingAttempt::new(platform_logs, vector_store_log, started_at);
        self.log_store.save_attempt(&attempt).await?;

        info!(outcome = attempt.outcome, "\n{}", attempt.summary());
        Ok(attempt)
    }
}
