use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single committed piece of final transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionSegment {
    /// Unique segment identifier
    pub id: String,

    /// Finalized text (post-processed if hooks are installed)
    pub text: String,

    /// When this segment was committed
    pub timestamp: DateTime<Utc>,

    /// Confidence score (0.0 to 1.0); engines that omit one get the default
    pub confidence: f32,

    /// Always true for committed segments; kept for serialized transcripts
    pub is_final: bool,

    /// Speaker label, present only when a collaborator supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl TranscriptionSegment {
    pub fn new(text: impl Into<String>, confidence: f32, speaker: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            timestamp: Utc::now(),
            confidence,
            is_final: true,
            speaker,
        }
    }
}
