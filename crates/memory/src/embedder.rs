//! Embedders used by the vector index.

use async_trait::async_trait;
use buddybot_core::error::StoreError;
use buddybot_core::provider::{EmbeddingRequest, Provider};
use buddybot_core::store::Embedder;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Deterministic bag-of-words embedder using the hashing trick.
///
/// Each lowercase alphanumeric token is hashed into one of `dimension`
/// buckets with a hash-derived sign, and the result is normalized to a unit
/// vector. Texts sharing vocabulary land close together, which is enough for
/// offline use and reproducible tests.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let hash = hasher.finish();

            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        Ok(texts.iter().map(|t| self.generate_embedding(t)).collect())
    }
}

/// Embedder backed by the LLM provider's embeddings endpoint.
pub struct ProviderEmbedder {
    provider: Arc<dyn Provider>,
    model: String,
    batch_size: usize,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            batch_size: 64,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

#[async_trait]
impl Embedder for ProviderEmbedder {
    fn name(&self) -> &str {
        "provider"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let response = self
                .provider
                .embed(EmbeddingRequest {
                    model: self.model.clone(),
                    inputs: batch.to_vec(),
                })
                .await
                .map_err(|e| StoreError::EmbeddingFailed(e.to_string()))?;

            if response.embeddings.len() != batch.len() {
                return Err(StoreError::EmbeddingFailed(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    response.embeddings.len()
                )));
            }
            embeddings.extend(response.embeddings);
        }

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::squared_l2_distance;
    use buddybot_core::error::ProviderError;
    use buddybot_core::provider::{EmbeddingResponse, ProviderRequest, ProviderResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn hashing_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(64);
        let texts = vec!["Deploy the billing service".to_string()];
        let a = embedder.embed(&texts).await.unwrap();
        let b = embedder.embed(&texts).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].len(), 64);
        let norm: f32 = a[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn shared_vocabulary_is_closer() {
        let embedder = HashingEmbedder::default();
        let texts = vec![
            "how do I rotate the database password".to_string(),
            "rotate the database password every month".to_string(),
            "quarterly marketing newsletter draft".to_string(),
        ];
        let v = embedder.embed(&texts).await.unwrap();
        assert!(squared_l2_distance(&v[0], &v[1]) < squared_l2_distance(&v[0], &v[2]));
    }

    #[tokio::test]
    async fn empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(8);
        let v = embedder.embed(&[String::new()]).await.unwrap();
        assert!(v[0].iter().all(|x| *x == 0.0));
    }

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Provider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("no completions".into()))
        }

        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::Network("connection reset".into()));
            }
            Ok(EmbeddingResponse {
                embeddings: request.inputs.iter().map(|t| vec![t.len() as f32, 1.0]).collect(),
                model: request.model,
            })
        }
    }

    #[tokio::test]
    async fn provider_embedder_batches_requests() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let embedder = ProviderEmbedder::new(provider.clone(), "m").with_batch_size(2);
        let texts: Vec<String> = (0..5).map(|i| "x".repeat(i)).collect();
        let v = embedder.embed(&texts).await.unwrap();
        assert_eq!(v.len(), 5);
        assert_eq!(v[3], vec![3.0, 1.0]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn provider_failure_is_embedding_failed() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let embedder = ProviderEmbedder::new(provider, "m");
        let err = embedder.embed(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, StoreError::EmbeddingFailed(_)));
    }
}
