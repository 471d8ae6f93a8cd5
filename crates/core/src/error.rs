//! Error types for the BuddyBot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all BuddyBot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Store errors (vector index, history, audit log) ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Relevance / ranking errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Platform source errors ---
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),
}

/// A retrieved document violated the similarity-search contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetrievalError {
    #[error("document #{index} has no distance in its metadata")]
    MissingDistance { index: usize },

    #[error("document #{index} has an invalid distance: {reason}")]
    InvalidDistance { index: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {item} export at {path}: {reason}")]
    ReadFailed {
        item: String,
        path: String,
        reason: String,
    },

    #[error("Malformed {item} export: {reason}")]
    Malformed { item: String, reason: String },
}
