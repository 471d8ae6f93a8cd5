//! Ingestion audit types.
//!
//! Every ingestion run produces one [`LoadingAttempt`]: a log line per
//! platform fetch plus one for the vector-index sync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kinds of content fetched from the collaboration platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingItem {
    #[serde(rename = "github_commits")]
    GitHubCommits,
    #[serde(rename = "github_files")]
    GitHubFiles,
    JiraIssues,
    ConfluencePages,
}

impl LoadingItem {
    pub const ALL: [LoadingItem; 4] = [
        LoadingItem::GitHubCommits,
        LoadingItem::GitHubFiles,
        LoadingItem::JiraIssues,
        LoadingItem::ConfluencePages,
    ];

    /// Human-readable label used in audit summaries.
    pub fn label(&self) -> &'static str {
        match self {
            LoadingItem::GitHubCommits => "GitHub Commits",
            LoadingItem::GitHubFiles => "GitHub Files",
            LoadingItem::JiraIssues => "Jira Issues",
            LoadingItem::ConfluencePages => "Confluence Pages",
        }
    }
}

impl std::fmt::Display for LoadingItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of fetching one kind of item from its platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformLog {
    pub item: LoadingItem,
    pub timestamp: DateTime<Utc>,
    pub outcome: bool,
}

impl PlatformLog {
    pub fn new(item: LoadingItem, outcome: bool) -> Self {
        Self {
            item,
            timestamp: Utc::now(),
            outcome,
        }
    }
}

/// Outcome of syncing a batch of chunks into the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreLog {
    pub timestamp: DateTime<Utc>,
    pub outcome: bool,
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
}

impl VectorStoreLog {
    pub fn success(added: usize, modified: usize, deleted: usize) -> Self {
        Self {
            timestamp: Utc::now(),
            outcome: true,
            added,
            modified,
            deleted,
        }
    }

    pub fn failure() -> Self {
        Self {
            timestamp: Utc::now(),
            outcome: false,
            added: 0,
            modified: 0,
            deleted: 0,
        }
    }
}

/// A complete ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingAttempt {
    pub platform_logs: Vec<PlatformLog>,
    pub vector_store_log: VectorStoreLog,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub outcome: bool,
}

impl LoadingAttempt {
    /// Assemble a run; it ends when the index sync ends and succeeds only if
    /// every platform fetch and the sync succeeded.
    pub fn new(
        platform_logs: Vec<PlatformLog>,
        vector_store_log: VectorStoreLog,
        started_at: DateTime<Utc>,
    ) -> Self {
        let outcome =
            platform_logs.iter().all(|log| log.outcome) && vector_store_log.outcome;
        Self {
            ended_at: vector_store_log.timestamp,
            platform_logs,
            vector_store_log,
            started_at,
            outcome,
        }
    }

    /// Multi-line report appended to the ingestion log.
    pub fn summary(&self) -> String {
        let items: Vec<&str> = self.platform_logs.iter().map(|l| l.item.label()).collect();
        format!(
            "=============================================\n\
             Vector index update attempt:\n\
             - Outcome: {}\n\
             - Items: {}\n\
             - Started: {}\n\
             - Ended: {}\n\
             - Added: {}\n\
             - Modified: {}\n\
             - Deleted: {}\n\
             =============================================\n",
            if self.outcome { "succeeded" } else { "failed" },
            items.join(", "),
            self.started_at.format("%Y/%m/%d %H:%M:%S"),
            self.ended_at.format("%Y/%m/%d %H:%M:%S"),
            self.vector_store_log.added,
            self.vector_store_log.modified,
            self.vector_store_log.deleted,
        )
    }
}

/// The outcome badge shown to chat users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastLoadOutcome {
    pub outcome: bool,
    pub ended_at: DateTime<Utc>,
}

impl From<&LoadingAttempt> for LastLoadOutcome {
    fn from(attempt: &LoadingAttempt) -> Self {
        Self {
            outcome: attempt.outcome,
            ended_at: attempt.ended_at,
        }
    }
}
