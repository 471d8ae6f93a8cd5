//! CLI subcommands and the wiring they share.

pub mod ask;
pub mod config_cmd;
pub mod history;
pub mod ingest;
pub mod schedule;
pub mod status;
pub mod suggest;

use std::path::Path;
use std::sync::Arc;

use buddybot_agent::{ChatService, SuggestionService};
use buddybot_config::{AppConfig, EmbedderKind};
use buddybot_core::provider::Provider;
use buddybot_core::store::Embedder;
use buddybot_ingest::IngestionJob;
use buddybot_memory::{FileHistory, HashingEmbedder, InMemoryIndex, ProviderEmbedder};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Load the config from `path`, or the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(config)
}

/// Everything a command needs, built once from the config.
pub struct Runtime {
    pub config: AppConfig,
    pub provider: Arc<dyn Provider>,
    pub index: Arc<InMemoryIndex>,
    pub history: Arc<FileHistory>,
}

impl Runtime {
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(load_config(path)?))
    }

    pub fn new(config: AppConfig) -> Self {
        let provider = buddybot_providers::build_from_config(&config);
        let embedder = build_embedder(&config, provider.clone());
        let data_dir = &config.storage.data_dir;

        let index = Arc::new(
            InMemoryIndex::persistent(embedder, data_dir.join("index.json"))
                .with_max_results(config.retrieval.max_results),
        );
        let history = Arc::new(FileHistory::open(data_dir));

        Self {
            config,
            provider,
            index,
            history,
        }
    }

    pub fn chat_service(&self) -> ChatService {
        ChatService::from_config(&self.config, self.index.clone(), self.provider.clone())
    }

    pub fn suggestion_service(&self) -> SuggestionService {
        SuggestionService::from_config(&self.config, self.provider.clone())
    }

    pub fn ingestion_job(&self) -> IngestionJob {
        IngestionJob::from_config(&self.config, self.index.clone(), self.history.clone())
    }
}

pub fn build_embedder(config: &AppConfig, provider: Arc<dyn Provider>) -> Arc<dyn Embedder> {
    match config.retrieval.embedder {
        EmbedderKind::Hashing => Arc::new(HashingEmbedder::new(config.retrieval.embedding_dim)),
        EmbedderKind::Provider => Arc::new(ProviderEmbedder::new(
            provider,
            config.llm.embedding_model.clone(),
        )),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use buddybot_core::error::ProviderError;
    use buddybot_core::provider::{ProviderRequest, ProviderResponse};

    /// Replies with the same text to every request.
    pub struct EchoProvider(pub &'static str);

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                content: self.0.into(),
                usage: None,
                model: request.model,
            })
        }
    }

    /// A runtime storing everything under `dir`, answering with `reply`.
    pub fn runtime(dir: &Path, reply: &'static str) -> Runtime {
        let mut config = AppConfig::default();
        config.storage.data_dir = dir.to_path_buf();
        let mut runtime = Runtime::new(config);
        runtime.provider = Arc::new(EchoProvider(reply));
        runtime
    }
}
