use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::store::{StoreError, TranscriptRecord, TranscriptStore, TranscriptSummary};

/// One JSON document per transcript under a configured directory
pub struct FileLibrary {
    dir: PathBuf,
}

impl FileLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        // Ids are generated in-process; reject anything path-like that
        // arrives over the API.
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

#[async_trait::async_trait]
impl TranscriptStore for FileLibrary {
    async fn save(&self, record: &TranscriptRecord) -> Result<String, StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.record_path(&record.id)?;
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, json).await?;

        debug!("Saved transcript {} to {}", record.id, path.display());
        Ok(record.id.clone())
    }

    async fn get(&self, id: &str) -> Result<TranscriptRecord, StoreError> {
        let path = self.record_path(id)?;
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    async fn list(&self) -> Result<Vec<TranscriptSummary>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match tokio::fs::read_to_string(&path).await {
                Ok(json) => match serde_json::from_str::<TranscriptRecord>(&json) {
                    Ok(record) => summaries.push(TranscriptSummary::of(&record)),
                    Err(e) => warn!("Skipping corrupt record {}: {}", path.display(), e),
                },
                Err(e) => warn!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, text: &str) -> TranscriptRecord {
        TranscriptRecord {
            id: id.to_string(),
            title: "Test".to_string(),
            created_at: chrono::Utc::now(),
            language: "en-US".to_string(),
            duration_secs: 12,
            word_count: text.split_whitespace().count(),
            text: text.to_string(),
            segments: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_save_then_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let library = FileLibrary::new(dir.path());

        let id = library.save(&record("tr-abc123", "hello there")).await.unwrap();
        assert_eq!(id, "tr-abc123");

        let loaded = library.get("tr-abc123").await.unwrap();
        assert_eq!(loaded.text, "hello there");
        assert_eq!(loaded.word_count, 2);
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let dir = tempfile::tempdir().unwrap();
        let library = FileLibrary::new(dir.path());

        assert!(matches!(
            library.get("tr-missing").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_path_like_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let library = FileLibrary::new(dir.path());

        assert!(matches!(
            library.get("../etc/passwd").await,
            Err(StoreError::NotFound(_))
        ));
    }
}
