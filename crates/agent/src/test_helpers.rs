//! Shared test doubles for the service tests.

use async_trait::async_trait;
use buddybot_core::document::{Metadata, ScoredDocument};
use buddybot_core::error::{ProviderError, StoreError};
use buddybot_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use buddybot_core::store::SimilaritySearch;
use std::sync::Mutex;

/// A provider that always gives the same reply (or error) and records prompts.
pub struct ScriptedProvider {
    reply: Result<String, ProviderError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            reply: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);

        let content = self.reply.clone()?;
        Ok(ProviderResponse {
            content,
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: request.model,
        })
    }
}

/// Similarity search returning a fixed result set.
pub struct StaticSearch {
    hits: Option<Vec<ScoredDocument>>,
}

impl StaticSearch {
    pub fn new(hits: Vec<ScoredDocument>) -> Self {
        Self { hits: Some(hits) }
    }

    pub fn failing() -> Self {
        Self { hits: None }
    }
}

#[async_trait]
impl SimilaritySearch for StaticSearch {
    async fn search(&self, _query: &str) -> Result<Vec<ScoredDocument>, StoreError> {
        self.hits
            .clone()
            .ok_or_else(|| StoreError::QueryFailed("index unavailable".into()))
    }
}

/// A hit with `content` at `distance` and no other metadata.
pub fn hit(content: &str, distance: f64) -> ScoredDocument {
    ScoredDocument::with_distance(content, Metadata::new(), distance)
}
