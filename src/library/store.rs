use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transcript::TranscriptionSegment;

/// A saved transcript, the unit the library stores and returns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub language: String,
    pub duration_secs: u64,
    pub word_count: usize,
    pub text: String,
    pub segments: Vec<TranscriptionSegment>,
}

/// Listing entry; everything but the transcript body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub language: String,
    pub word_count: usize,
}

impl TranscriptSummary {
    pub fn of(record: &TranscriptRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            created_at: record.created_at,
            language: record.language.clone(),
            word_count: record.word_count,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transcript '{0}' not found")]
    NotFound(String),

    #[error("library I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored transcript is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Storage backend for saved transcripts
#[async_trait::async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Persist a record; returns its id.
    async fn save(&self, record: &TranscriptRecord) -> Result<String, StoreError>;

    /// Fetch one record by id.
    async fn get(&self, id: &str) -> Result<TranscriptRecord, StoreError>;

    /// List all saved transcripts, newest first.
    async fn list(&self) -> Result<Vec<TranscriptSummary>, StoreError>;
}
