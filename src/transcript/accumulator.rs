use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize::{SegmentFilter, SpacingNormalizer};
use super::segment::TranscriptionSegment;

/// Confidence assumed when the engine does not report one
pub const DEFAULT_CONFIDENCE: f32 = 0.8;

/// Configuration for transcript accumulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Minimum confidence for a final piece to be committed
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Run the spacing normalizer on final text
    #[serde(default = "default_normalize_spacing")]
    pub normalize_spacing: bool,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            normalize_spacing: default_normalize_spacing(),
        }
    }
}

fn default_confidence_threshold() -> f32 {
    0.5
}

fn default_normalize_spacing() -> bool {
    true
}

/// Append-only transcript accumulation with a volatile interim buffer
///
/// Final pieces become segments, one per piece, in arrival order; segments
/// are never reordered or mutated after commit. Interim hypotheses live in a
/// single buffer that is replaced wholesale on every recognition event.
pub struct TranscriptAccumulator {
    threshold: f32,
    segments: Vec<TranscriptionSegment>,
    interim: String,
    filters: Vec<Box<dyn SegmentFilter>>,
}

impl TranscriptAccumulator {
    pub fn new(config: TranscriptConfig) -> Self {
        let mut filters: Vec<Box<dyn SegmentFilter>> = Vec::new();
        if config.normalize_spacing {
            filters.push(Box::new(SpacingNormalizer));
        }

        Self {
            threshold: config.confidence_threshold,
            segments: Vec::new(),
            interim: String::new(),
            filters,
        }
    }

    /// Install an additional post-processing hook.
    pub fn add_filter(&mut self, filter: Box<dyn SegmentFilter>) {
        self.filters.push(filter);
    }

    /// Commit one final piece.
    ///
    /// Empty text and sub-threshold confidence commit nothing; the drop is
    /// silent apart from a debug log. Missing confidence defaults to
    /// `DEFAULT_CONFIDENCE` before the threshold check. Committing clears
    /// the interim buffer.
    pub fn commit_final(
        &mut self,
        text: &str,
        confidence: Option<f32>,
        speaker: Option<String>,
    ) -> Option<&TranscriptionSegment> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let confidence = confidence.unwrap_or(DEFAULT_CONFIDENCE).clamp(0.0, 1.0);
        if confidence < self.threshold {
            debug!(
                "Dropping low-confidence final ({:.2} < {:.2}): {}",
                confidence, self.threshold, text
            );
            return None;
        }

        let mut processed = text.to_string();
        for filter in &self.filters {
            if let Some(next) = filter.apply(&processed) {
                processed = next;
            }
        }
        // A hook must never erase the piece outright
        if processed.trim().is_empty() {
            processed = text.to_string();
        }

        self.segments
            .push(TranscriptionSegment::new(processed, confidence, speaker));
        self.interim.clear();
        self.segments.last()
    }

    /// Replace the interim buffer wholesale.
    pub fn set_interim(&mut self, text: &str) {
        self.interim.clear();
        self.interim.push_str(text.trim());
    }

    /// Drop the interim buffer (stale once an engine session dies).
    pub fn clear_interim(&mut self) {
        self.interim.clear();
    }

    /// Committed segments joined by spaces, plus the interim tail if any.
    pub fn full_text(&self) -> String {
        let mut text = self
            .segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        if !self.interim.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&self.interim);
        }

        text
    }

    pub fn word_count(&self) -> usize {
        self.full_text().split_whitespace().count()
    }

    pub fn segments(&self) -> &[TranscriptionSegment] {
        &self.segments
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.interim.is_empty()
    }

    /// Empty segments and interim alike.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.interim.clear();
    }
}

/// Everything a reader wants to know, captured under one lock hold
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptSnapshot {
    /// Committed text plus trailing interim
    pub text: String,
    pub interim: String,
    pub segments: Vec<TranscriptionSegment>,
    pub word_count: usize,
}

/// Cheap-clone shared handle to the accumulator
///
/// The controller applies whole result batches under one lock hold, so
/// readers never observe a batch half-applied (finals committed without the
/// matching interim update).
#[derive(Clone)]
pub struct SharedTranscript {
    inner: Arc<Mutex<TranscriptAccumulator>>,
}

impl SharedTranscript {
    pub fn new(config: TranscriptConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TranscriptAccumulator::new(config))),
        }
    }

    /// Run `f` with the accumulator locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut TranscriptAccumulator) -> R) -> R {
        let mut acc = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut acc)
    }

    pub fn full_text(&self) -> String {
        self.with(|t| t.full_text())
    }

    pub fn word_count(&self) -> usize {
        self.with(|t| t.word_count())
    }

    pub fn segments(&self) -> Vec<TranscriptionSegment> {
        self.with(|t| t.segments().to_vec())
    }

    pub fn interim(&self) -> String {
        self.with(|t| t.interim().to_string())
    }

    pub fn segment_count(&self) -> usize {
        self.with(|t| t.len())
    }

    pub fn snapshot(&self) -> TranscriptSnapshot {
        self.with(|t| TranscriptSnapshot {
            text: t.full_text(),
            interim: t.interim().to_string(),
            segments: t.segments().to_vec(),
            word_count: t.word_count(),
        })
    }

    pub fn clear(&self) {
        self.with(|t| t.clear())
    }
}
