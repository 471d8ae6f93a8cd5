//! Platform sources backed by exported JSON files.
//!
//! Each export is a JSON array of `{ "content": ..., "metadata": { ... } }`
//! objects for one [`LoadingItem`], as produced by the platform exporters.

use async_trait::async_trait;
use buddybot_config::SourceConfig;
use buddybot_core::document::Document;
use buddybot_core::error::SourceError;
use buddybot_core::ingest::LoadingItem;
use buddybot_core::store::PlatformSource;
use std::path::PathBuf;
use tracing::debug;

pub struct JsonExportSource {
    item: LoadingItem,
    path: PathBuf,
}

impl JsonExportSource {
    pub fn new(item: LoadingItem, path: impl Into<PathBuf>) -> Self {
        Self {
            item,
            path: path.into(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(config.item, &config.path)
    }
}

#[async_trait]
impl PlatformSource for JsonExportSource {
    fn item(&self) -> LoadingItem {
        self.item
    }

    async fn fetch(&self) -> Result<Vec<Document>, SourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::ReadFailed {
                item: self.item.to_string(),
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

        let documents: Vec<Document> =
            serde_json::from_str(&content).map_err(|e| SourceError::Malformed {
                item: self.item.to_string(),
                reason: e.to_string(),
            })?;

        debug!(item = %self.item, count = documents.len(), "Export read");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jira.json");
        std::fs::write(
            &path,
            r#"[
                {"content": "Login fails on Safari", "metadata": {"id": "BUD-1", "url": "https://jira/BUD-1"}},
                {"content": "Add dark mode"}
            ]"#,
        )
        .unwrap();

        let source = JsonExportSource::new(LoadingItem::JiraIssues, &path);
        let docs = source.fetch().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id(), "BUD-1");
        assert!(docs[1].metadata.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_read_failed() {
        let source = JsonExportSource::new(LoadingItem::GitHubFiles, "/nonexistent/files.json");
        assert!(matches!(
            source.fetch().await,
            Err(SourceError::ReadFailed { .. })
        ));
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.json");
        std::fs::write(&path, "{\"content\": 1}").unwrap();
        let source = JsonExportSource::new(LoadingItem::ConfluencePages, &path);
        assert!(matches!(
            source.fetch().await,
            Err(SourceError::Malformed { .. })
        ));
    }
}
