//! Configuration loading, validation, and management for BuddyBot.
//!
//! Loads configuration from `~/.buddybot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use buddybot_core::ingest::LoadingItem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.buddybot/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language model and embeddings endpoint
    #[serde(default)]
    pub llm: LlmConfig,

    /// Similarity search and relevance filtering
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Prompt token ceiling
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Instruction headers
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// Periodic ingestion job
    #[serde(default)]
    pub ingestion: IngestionConfig,

    /// Where history, audit logs and the index snapshot live
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (usually supplied through the environment)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per generated answer
    #[serde(default = "default_max_response_tokens")]
    pub max_response_tokens: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_response_tokens() -> u32 {
    4096
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            max_response_tokens: default_max_response_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("temperature", &self.temperature)
            .field("max_response_tokens", &self.max_response_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// What to do with a search hit that carries no distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDistanceMode {
    /// Treat it as a broken upstream contract and fail the request.
    #[default]
    Reject,
    /// Substitute `fallback_distance`.
    Fallback,
}

/// Which embedder backs the vector index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    /// Local feature-hashing embedder; no network access.
    #[default]
    Hashing,
    /// The configured LLM endpoint's embeddings API.
    Provider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum admissible distance
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Maximum distance jump between consecutive admitted hits
    #[serde(default = "default_max_gap")]
    pub max_gap: f64,

    #[serde(default)]
    pub missing_distance: MissingDistanceMode,

    #[serde(default = "default_fallback_distance")]
    pub fallback_distance: f64,

    /// Hits requested from the index per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default)]
    pub embedder: EmbedderKind,

    /// Dimension of the hashing embedder
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
}

fn default_similarity_threshold() -> f64 {
    1.2
}
fn default_max_gap() -> f64 {
    0.3
}
fn default_fallback_distance() -> f64 {
    1.0
}
fn default_max_results() -> usize {
    10_000
}
fn default_embedding_dim() -> usize {
    256
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            max_gap: default_max_gap(),
            missing_distance: MissingDistanceMode::default(),
            fallback_distance: default_fallback_distance(),
            max_results: default_max_results(),
            embedder: EmbedderKind::default(),
            embedding_dim: default_embedding_dim(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Approximate token ceiling for header + question + context
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_max_tokens() -> usize {
    128_000
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    #[serde(default = "default_answer_header")]
    pub answer_header: String,

    /// Must contain `***quantity***`
    #[serde(default = "default_suggestions_header")]
    pub suggestions_header: String,
}

fn default_answer_header() -> String {
    "You are an expert virtual assistant. You will be given a user question and a context \
     made of code, issues and documentation of a software company, coming from GitHub, Jira \
     and Confluence respectively. Answer using only the data provided as context, giving a \
     detailed and exhaustive explanation. When possible answer with a bulleted or numbered list. \
     At the end of the message list the url metadata of the documents the answer was drawn \
     from, introduced by the exact text \"Related links:\". If the answer is not in the \
     documents but the question is about software, reply \"Information not found\". If the \
     answer exists but no document has a 'url' metadata, reply \"No related links were found\". \
     If the question is outside the software domain, reply \"The question is out of context\"."
        .into()
}

fn default_suggestions_header() -> String {
    "You are an expert virtual assistant whose context is the code, issues and documentation \
     of a software company, coming from GitHub, Jira and Confluence. A user has already asked \
     a question and you have already answered it; both are given below. Generate ***quantity*** \
     possible questions to continue the conversation, based only on that question and answer. \
     If you have no ideas, propose generic questions about GitHub, Jira and Confluence. Return \
     exactly ***quantity*** questions separated by three underscores (___) and nothing else, \
     for example: Who solved issue BUD-240?___What did the customer say about quality \
     metrics?___Where is the function that reads from the database?"
        .into()
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            answer_header: default_answer_header(),
            suggestions_header: default_suggestions_header(),
        }
    }
}

/// A platform export consumed by the ingestion job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub item: LoadingItem,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Maximum characters per indexed chunk
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,

    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

fn default_max_chunk_size() -> usize {
    41_666
}
fn default_interval_minutes() -> u64 {
    24 * 60
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            interval_minutes: default_interval_minutes(),
            sources: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    AppConfig::config_dir().join("data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.buddybot/config.toml).
    ///
    /// Environment variables override the file:
    /// - `BUDDYBOT_API_KEY`, then `OPENAI_API_KEY`
    /// - `BUDDYBOT_MODEL`, then `OPENAI_MODEL_NAME`
    /// - `BUDDYBOT_API_URL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load a specific file, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("BUDDYBOT_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = lookup("BUDDYBOT_MODEL").or_else(|| lookup("OPENAI_MODEL_NAME")) {
            self.llm.model = model;
        }
        if let Some(url) = lookup("BUDDYBOT_API_URL") {
            self.llm.api_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".buddybot")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.temperature < 0.0 || self.llm.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        let retrieval = &self.retrieval;
        if !(retrieval.similarity_threshold >= 0.0) {
            return Err(ConfigError::ValidationError(
                "retrieval.similarity_threshold must be non-negative".into(),
            ));
        }
        if !(retrieval.max_gap >= 0.0) {
            return Err(ConfigError::ValidationError(
                "retrieval.max_gap must be non-negative".into(),
            ));
        }
        if !(retrieval.fallback_distance >= 0.0) {
            return Err(ConfigError::ValidationError(
                "retrieval.fallback_distance must be non-negative".into(),
            ));
        }
        if retrieval.embedding_dim == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.embedding_dim must be > 0".into(),
            ));
        }

        if self.budget.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "budget.max_tokens must be > 0".into(),
            ));
        }

        if self.ingestion.max_chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "ingestion.max_chunk_size must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.llm.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
