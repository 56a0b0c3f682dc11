//! Append-only analysis history.
//!
//! One flat JSON array, loaded fully at startup and rewritten wholesale on
//! every append. The store owns an internal lock so concurrent requests
//! cannot lose each other's appends; the file write itself is still a plain
//! overwrite with no atomic-rename guarantee.

use crate::error::{ResumenError, Result};
use crate::render::GeneratedFileSet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::warn;

/// One persisted record of a completed analysis request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    /// Short random request token.
    pub id: String,
    pub title: String,
    pub url: String,
    /// Source-defined content date string (not guaranteed ISO).
    pub date: String,
    /// Date the report was generated (`%Y-%m-%d`).
    pub report_date: String,
    /// Per-request output directory name, unique across requests.
    pub dir_name: String,
    pub files: GeneratedFileSet,
    pub thumbnail: String,
}

/// Mutex-guarded history store backed by a flat JSON file.
pub struct HistoryStore {
    path: PathBuf,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// Load the full history from disk. A missing or unreadable file starts
    /// an empty history.
    pub fn load(path: PathBuf) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("History file {} is unreadable ({}), starting empty", path.display(), e);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Append one entry and rewrite the backing file.
    pub async fn append(&self, entry: HistoryEntry) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.push(entry);
        self.persist(&entries)
    }

    /// Snapshot of all entries in insertion order.
    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().await.clone()
    }

    fn persist(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)
            .map_err(|e| ResumenError::History(format!("Failed to persist history: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry(id: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            title: format!("Video {}", id),
            url: "https://example.test/v1".to_string(),
            date: "20240115".to_string(),
            report_date: "2024-02-01".to_string(),
            dir_name: format!("Video_{}_{}", id, id),
            files: GeneratedFileSet::new(),
            thumbnail: String::new(),
        }
    }

    #[tokio::test]
    async fn test_append_preserves_insertion_order() {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::load(tmp.path().join("history.json"));

        for id in ["aa", "bb", "cc"] {
            store.append(sample_entry(id)).await.unwrap();
        }

        let entries = store.entries().await;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].id, "aa");
        assert_eq!(entries[2].id, "cc");
    }

    #[tokio::test]
    async fn test_reload_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");

        {
            let store = HistoryStore::load(path.clone());
            store.append(sample_entry("aa")).await.unwrap();
        }

        let reloaded = HistoryStore::load(path);
        let entries = reloaded.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Video aa");
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.json");
        std::fs::write(&path, "not json {{{").unwrap();

        let store = HistoryStore::load(path);
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = HistoryStore::load(tmp.path().join("absent.json"));
        assert!(store.entries().await.is_empty());
    }

    #[test]
    fn test_entry_serde_field_names() {
        let entry = HistoryEntry {
            id: "ab12cd34".to_string(),
            title: "T".to_string(),
            url: "u".to_string(),
            date: "d".to_string(),
            report_date: "r".to_string(),
            dir_name: "T_ab12cd34".to_string(),
            files: GeneratedFileSet::new(),
            thumbnail: "th".to_string(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        for field in ["id", "title", "url", "date", "report_date", "dir_name", "files", "thumbnail"] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
    }
}
