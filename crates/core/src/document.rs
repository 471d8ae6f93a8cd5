//! Document value types.
//!
//! A document starts life as an ingested [`Document`], is split into chunks
//! and indexed, comes back from similarity search as a [`ScoredDocument`],
//! and is finally rewritten into an [`AnnotatedDocument`] right before it is
//! placed into a prompt.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RetrievalError;

/// Ordered string-keyed metadata attached to every document.
pub type Metadata = serde_json::Map<String, Value>;

/// Metadata key under which the vector index stamps the query distance.
pub const DISTANCE_KEY: &str = "distance";

/// Metadata key holding a chunk's unique index key, `"{id}_{chunk_index}"`.
pub const DOC_ID_KEY: &str = "doc_id";

/// A document fetched from a platform, before chunking and indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// The platform identifier stored under `id`, rendered as a string.
    ///
    /// Returns an empty string when the document carries no `id`.
    pub fn id(&self) -> String {
        metadata_string(&self.metadata, "id")
    }

    /// The chunk key stamped by the chunker, or an empty string.
    pub fn doc_id(&self) -> String {
        metadata_string(&self.metadata, DOC_ID_KEY)
    }
}

fn metadata_string(metadata: &Metadata, key: &str) -> String {
    match metadata.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// One similarity-search hit.
///
/// The distance lives in `metadata["distance"]`; lower means more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ScoredDocument {
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Build a hit and stamp its distance in one step.
    pub fn with_distance(content: impl Into<String>, mut metadata: Metadata, distance: f64) -> Self {
        metadata.insert(DISTANCE_KEY.into(), Value::from(distance));
        Self::new(content, metadata)
    }

    /// Read the stamped distance.
    ///
    /// `Ok(None)` when the key is absent. `index` is the document's position
    /// in its result set and is only used for error reporting.
    pub fn distance(&self, index: usize) -> Result<Option<f64>, RetrievalError> {
        let Some(raw) = self.metadata.get(DISTANCE_KEY) else {
            return Ok(None);
        };
        let value = raw.as_f64().ok_or_else(|| RetrievalError::InvalidDistance {
            index,
            reason: format!("expected a number, found {raw}"),
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(RetrievalError::InvalidDistance {
                index,
                reason: format!("{value} is not a non-negative finite number"),
            });
        }
        Ok(Some(value))
    }

    /// Embed the metadata into the content for prompt inclusion.
    pub fn annotate(self) -> AnnotatedDocument {
        AnnotatedDocument {
            content: annotate_content(&self.content, &self.metadata),
            metadata: self.metadata,
        }
    }
}

/// A document whose content carries its own metadata as a textual prefix.
///
/// Prompt builders only forward the content, so the metadata (author, url,
/// distance) would otherwise never reach the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub content: String,
    pub metadata: Metadata,
}

/// Render `"Metadata: {metadata}\nContent: {content}"`.
///
/// Metadata is rendered as a compact JSON object.
pub fn annotate_content(content: &str, metadata: &Metadata) -> String {
    format!(
        "Metadata: {}\nContent: {}",
        Value::Object(metadata.clone()),
        content
    )
}
