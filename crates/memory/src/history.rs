//! Chat history and ingestion audit log.
//!
//! Two backends share the same paging rules:
//! - `InMemoryHistory` for tests and one-shot sessions
//! - `FileHistory`, JSON-lines files under the data directory
//!   (`messages.jsonl`, `loading_attempts.jsonl`), appended on every save

use async_trait::async_trait;
use buddybot_core::chat::Message;
use buddybot_core::error::StoreError;
use buddybot_core::ingest::{LastLoadOutcome, LoadingAttempt};
use buddybot_core::store::{LoadLogStore, MessageStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Page `page` (0 = newest) of `quantity` items, in chronological order.
fn page_of<T: Clone>(items: &[T], quantity: usize, page: usize) -> Vec<T> {
    let skip = quantity.saturating_mul(page);
    if quantity == 0 || skip >= items.len() {
        return Vec::new();
    }
    let end = items.len() - skip;
    let start = end.saturating_sub(quantity);
    items[start..end].to_vec()
}

/// Ephemeral history kept in process memory.
#[derive(Default)]
pub struct InMemoryHistory {
    messages: Arc<RwLock<Vec<Message>>>,
    attempts: Arc<RwLock<Vec<LoadingAttempt>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryHistory {
    async fn save(&self, message: Message) -> Result<(), StoreError> {
        self.messages.write().await.push(message);
        Ok(())
    }

    async fn recent(&self, quantity: usize, page: usize) -> Result<Vec<Message>, StoreError> {
        Ok(page_of(&self.messages.read().await, quantity, page))
    }
}

#[async_trait]
impl LoadLogStore for InMemoryHistory {
    async fn save_attempt(&self, attempt: &LoadingAttempt) -> Result<(), StoreError> {
        self.attempts.write().await.push(attempt.clone());
        Ok(())
    }

    async fn last_outcome(&self) -> Result<Option<LastLoadOutcome>, StoreError> {
        Ok(self.attempts.read().await.last().map(LastLoadOutcome::from))
    }
}

/// History persisted as JSON lines.
///
/// Files are loaded on creation and appended to on every save. Corrupted
/// lines are skipped with a warning.
pub struct FileHistory {
    messages_path: PathBuf,
    attempts_path: PathBuf,
    messages: Arc<RwLock<Vec<Message>>>,
    attempts: Arc<RwLock<Vec<LoadingAttempt>>>,
}

impl FileHistory {
    /// Open (or lazily create) the history files under `data_dir`.
    pub fn open(data_dir: &Path) -> Self {
        let messages_path = data_dir.join("messages.jsonl");
        let attempts_path = data_dir.join("loading_attempts.jsonl");
        let messages: Vec<Message> = load_lines(&messages_path);
        let attempts: Vec<LoadingAttempt> = load_lines(&attempts_path);
        debug!(
            dir = %data_dir.display(),
            messages = messages.len(),
            attempts = attempts.len(),
            "File history loaded"
        );
        Self {
            messages_path,
            attempts_path,
            messages: Arc::new(RwLock::new(messages)),
            attempts: Arc::new(RwLock::new(attempts)),
        }
    }
}

fn load_lines<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<T>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping corrupted history line");
                None
            }
        })
        .collect()
}

fn append_line<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| StoreError::Storage(format!("Failed to create data directory: {e}")))?;
    }

    let mut line = serde_json::to_string(value)
        .map_err(|e| StoreError::Storage(format!("Failed to serialize entry: {e}")))?;
    line.push('\n');

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::Storage(format!("Failed to open {}: {e}", path.display())))?;
    file.write_all(line.as_bytes())
        .map_err(|e| StoreError::Storage(format!("Failed to write {}: {e}", path.display())))?;

    Ok(())
}

#[async_trait]
impl MessageStore for FileHistory {
    async fn save(&self, message: Message) -> Result<(), StoreError> {
        let mut messages = self.messages.write().await;
        append_line(&self.messages_path, &message)?;
        messages.push(message);
        Ok(())
    }

    async fn recent(&self, quantity: usize, page: usize) -> Result<Vec<Message>, StoreError> {
        Ok(page_of(&self.messages.read().await, quantity, page))
    }
}

#[async_trait]
impl LoadLogStore for FileHistory {
    async fn save_attempt(&self, attempt: &LoadingAttempt) -> Result<(), StoreError> {
        let mut attempts = self.attempts.write().await;
        append_line(&self.attempts_path, attempt)?;
        attempts.push(attempt.clone());
        Ok(())
    }

    async fn last_outcome(&self) -> Result<Option<LastLoadOutcome>, StoreError> {
        Ok(self.attempts.read().await.last().map(LastLoadOutcome::from))
    }
}
