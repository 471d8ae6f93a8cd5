//! Splits fetched documents into index-sized chunks.

use std::collections::HashSet;

use buddybot_core::document::{DOC_ID_KEY, Document, Metadata};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

/// Metadata key recording when a chunk was prepared for the index.
pub const INSERTION_DATE_KEY: &str = "vector_store_insertion_date";

/// Metadata key holding a chunk's position within its document.
pub const CHUNK_INDEX_KEY: &str = "chunk_index";

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Split `documents` into chunks of at most `max_chunk_size` characters.
pub fn split(documents: Vec<Document>, max_chunk_size: usize) -> Vec<Document> {
    split_at(documents, max_chunk_size, Utc::now())
}

/// Same as [`split`], stamping `now` as the insertion date.
///
/// Only the first document with a given `id` is kept. Every chunk gets the
/// parent's metadata with list values joined by newlines, plus
/// `chunk_index`, `doc_id = "{id}_{chunk_index}"` and the insertion date.
/// A document with empty content produces no chunks.
pub fn split_at(
    documents: Vec<Document>,
    max_chunk_size: usize,
    now: DateTime<Utc>,
) -> Vec<Document> {
    let size = max_chunk_size.max(1);
    let inserted_at = now.format(DATE_FORMAT).to_string();
    let mut seen = HashSet::new();
    let mut chunks = Vec::new();

    for document in documents {
        let id = document.id();
        if !seen.insert(id.clone()) {
            debug!(id = %id, "Skipping duplicate document");
            continue;
        }

        let base = flatten_lists(document.metadata);
        let chars: Vec<char> = document.content.chars().collect();

        for (index, piece) in chars.chunks(size).enumerate() {
            let mut metadata = base.clone();
            metadata.insert(INSERTION_DATE_KEY.into(), Value::String(inserted_at.clone()));
            metadata.insert(CHUNK_INDEX_KEY.into(), Value::from(index));
            metadata.insert(DOC_ID_KEY.into(), Value::String(format!("{id}_{index}")));
            chunks.push(Document::new(piece.iter().collect::<String>(), metadata));
        }
    }

    info!(documents = seen.len(), chunks = chunks.len(), "Documents split");
    chunks
}

/// Index backends only accept scalar metadata.
fn flatten_lists(metadata: Metadata) -> Metadata {
    metadata
        .into_iter()
        .map(|(key, value)| match value {
            Value::Array(items) => {
                let joined = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                (key, Value::String(joined))
            }
            other => (key, other),
        })
        .collect()
}
