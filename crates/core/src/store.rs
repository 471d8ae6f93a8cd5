//! Ports to the stores and platforms surrounding the retrieval core.
//!
//! Implementations live in `buddybot-memory` (index, history, audit log) and
//! `buddybot-ingest` (platform sources). Tests implement them directly.

use async_trait::async_trait;

use crate::chat::Message;
use crate::document::{Document, ScoredDocument};
use crate::error::{SourceError, StoreError};
use crate::ingest::{LastLoadOutcome, LoadingAttempt, LoadingItem, VectorStoreLog};

/// Similarity search over the indexed chunks.
///
/// Results are sorted by ascending distance, and every result carries its
/// distance in `metadata["distance"]`.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<ScoredDocument>, StoreError>;
}

/// The writable side of the vector index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Backend name (e.g. "in_memory").
    fn name(&self) -> &str;

    /// Make the index contain exactly `chunks`, keyed by `metadata["doc_id"]`.
    ///
    /// Failures are reported through the returned log's `outcome`, never
    /// as an error, so that the ingestion run can still be audited.
    async fn sync(&self, chunks: Vec<Document>) -> VectorStoreLog;

    /// Number of indexed chunks.
    async fn len(&self) -> usize;
}

/// Turns texts into embedding vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError>;
}

/// Persisted chat history.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn save(&self, message: Message) -> Result<(), StoreError>;

    /// Page `page` (0 = newest) of `quantity` messages, oldest first.
    async fn recent(&self, quantity: usize, page: usize) -> Result<Vec<Message>, StoreError>;
}

/// Audit log of ingestion runs.
#[async_trait]
pub trait LoadLogStore: Send + Sync {
    async fn save_attempt(&self, attempt: &LoadingAttempt) -> Result<(), StoreError>;

    /// Outcome of the most recent run, if any run was recorded.
    async fn last_outcome(&self) -> Result<Option<LastLoadOutcome>, StoreError>;
}

/// One kind of content fetched from a collaboration platform.
#[async_trait]
pub trait PlatformSource: Send + Sync {
    fn item(&self) -> LoadingItem;

    async fn fetch(&self) -> Result<Vec<Document>, SourceError>;
}
