//! In-memory vector index with an optional JSON snapshot on disk.
//!
//! Chunks are keyed by `metadata["doc_id"]`. Searches embed the query,
//! rank every chunk by squared L2 distance, and stamp the distance into the
//! returned metadata.

use async_trait::async_trait;
use buddybot_core::document::{Document, Metadata, ScoredDocument};
use buddybot_core::error::StoreError;
use buddybot_core::ingest::VectorStoreLog;
use buddybot_core::store::{Embedder, SimilaritySearch, VectorIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexedChunk {
    doc_id: String,
    content: String,
    metadata: Metadata,
    embedding: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    embedder: String,
    chunks: Vec<IndexedChunk>,
}

/// Brute-force cosine index over every ingested chunk.
pub struct InMemoryIndex {
    embedder: Arc<dyn Embedder>,
    chunks: Arc<RwLock<Vec<IndexedChunk>>>,
    max_results: usize,
    snapshot_path: Option<PathBuf>,
}

impl InMemoryIndex {
    /// An empty, purely in-memory index.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            chunks: Arc::new(RwLock::new(Vec::new())),
            max_results: 10_000,
            snapshot_path: None,
        }
    }

    /// An index backed by a snapshot file, loaded now and rewritten on every sync.
    ///
    /// A snapshot produced by a different embedder is ignored, since its
    /// vectors are not comparable with fresh query embeddings.
    pub fn persistent(embedder: Arc<dyn Embedder>, path: PathBuf) -> Self {
        let chunks = Self::load_snapshot(&path, embedder.name());
        debug!(path = %path.display(), count = chunks.len(), "Vector index loaded");
        Self {
            embedder,
            chunks: Arc::new(RwLock::new(chunks)),
            max_results: 10_000,
            snapshot_path: Some(path),
        }
    }

    /// Cap the number of hits returned per query.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    fn load_snapshot(path: &Path, embedder: &str) -> Vec<IndexedChunk> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str::<Snapshot>(&content) {
            Ok(snapshot) if snapshot.embedder == embedder => snapshot.chunks,
            Ok(snapshot) => {
                warn!(
                    found = %snapshot.embedder,
                    expected = %embedder,
                    "Index snapshot was built by another embedder, starting empty"
                );
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Skipping corrupted index snapshot");
                Vec::new()
            }
        }
    }

    fn write_snapshot(&self, chunks: &[IndexedChunk]) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create index directory: {e}"))
            })?;
        }

        let snapshot = Snapshot {
            embedder: self.embedder.name().to_string(),
            chunks: chunks.to_vec(),
        };
        let json = serde_json::to_string(&snapshot)
            .map_err(|e| StoreError::Storage(format!("Failed to serialize index: {e}")))?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| StoreError::Storage(format!("Failed to write index snapshot: {e}")))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| StoreError::Storage(format!("Failed to replace index snapshot: {e}")))?;

        Ok(())
    }

    /// Replace the index contents with `batch`, returning (added, modified, deleted).
    async fn replace_all(&self, batch: Vec<Document>) -> Result<(usize, usize, usize), StoreError> {
        for (i, chunk) in batch.iter().enumerate() {
            if chunk.doc_id().is_empty() {
                return Err(StoreError::Storage(format!("chunk {i} has no doc_id")));
            }
        }

        let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;
        if embeddings.len() != batch.len() {
            return Err(StoreError::EmbeddingFailed(format!(
                "expected {} embeddings, got {}",
                batch.len(),
                embeddings.len()
            )));
        }

        let mut chunks = self.chunks.write().await;

        let mut seen: HashSet<String> = chunks.iter().map(|c| c.doc_id.clone()).collect();
        let batch_ids: HashSet<String> = batch.iter().map(|c| c.doc_id()).collect();
        let deleted = seen.iter().filter(|id| !batch_ids.contains(*id)).count();

        let mut modified = 0;
        let mut next: Vec<IndexedChunk> = Vec::with_capacity(batch_ids.len());
        for (chunk, embedding) in batch.into_iter().zip(embeddings) {
            let doc_id = chunk.doc_id();
            // Re-inserting an existing key replaces it.
            if !seen.insert(doc_id.clone()) {
                modified += 1;
                next.retain(|c| c.doc_id != doc_id);
            }
            next.push(IndexedChunk {
                doc_id,
                content: chunk.content,
                metadata: chunk.metadata,
                embedding,
            });
        }
        let added = texts.len() - modified;

        self.write_snapshot(&next)?;
        *chunks = next;

        Ok((added, modified, deleted))
    }
}

#[async_trait]
impl SimilaritySearch for InMemoryIndex {
    async fn search(&self, query: &str) -> Result<Vec<ScoredDocument>, StoreError> {
        let chunks = self.chunks.read().await;
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::EmbeddingFailed("no embedding for query".into()))?;

        let hits = crate::vector::nearest(
            &chunks,
            |c| c.embedding.as_slice(),
            &query_embedding,
            self.max_results,
        );

        Ok(hits
            .into_iter()
            .map(|(distance, c)| ScoredDocument::with_distance(&c.content, c.metadata.clone(), distance))
            .collect())
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn sync(&self, chunks: Vec<Document>) -> VectorStoreLog {
        let count = chunks.len();
        match self.replace_all(chunks).await {
            Ok((added, modified, deleted)) => {
                info!(count, added, modified, deleted, "Vector index synchronized");
                VectorStoreLog::success(added, modified, deleted)
            }
            Err(e) => {
                warn!(error = %e, "Vector index synchronization failed");
                VectorStoreLog::failure()
            }
        }
    }

    async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }
}
