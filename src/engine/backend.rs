use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::error::{EngineError, EngineErrorKind};
use super::replay::ReplayEngine;
use crate::config::RecognitionConfig;

/// A single recognition hypothesis delivered by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Recognized text for this piece
    pub text: String,
    /// Whether the engine has finalized this piece; interim pieces are
    /// revised by later events, final pieces never change
    pub is_final: bool,
    /// Confidence in [0.0, 1.0], when the engine reports one
    #[serde(default)]
    pub confidence: Option<f32>,
    /// Speaker label, when an external collaborator supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl RecognitionResult {
    /// A finalized piece with a confidence score.
    pub fn final_piece(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            confidence: Some(confidence),
            speaker: None,
        }
    }

    /// An interim hypothesis, still subject to revision.
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
            confidence: None,
            speaker: None,
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }
}

/// Events emitted over one engine session.
///
/// Session order is fixed: `Started` first, then any number of `Results`
/// batches, then exactly one terminal event (`Ended` or `Failed`). A single
/// `Results` batch may mix interim and multiple final pieces.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The engine session is live and audio is flowing
    Started,
    /// A batch of recognition results
    Results(Vec<RecognitionResult>),
    /// The engine session ended (after stop() or on its own); terminal
    Ended,
    /// The engine session failed; terminal
    Failed(EngineError),
}

/// Continuous speech recognition engine
///
/// One `start()` opens one engine session; events arrive on the returned
/// channel until a terminal event, after which the session is dead and a
/// fresh `start()` is required. Engines cut sessions off on their own after
/// a few minutes, so callers restart them to keep dictation continuous.
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Set the recognition language (BCP-47 tag, e.g. "en-US")
    ///
    /// Must be set before `start()`; changing language mid-session requires
    /// stop, reconfigure, start.
    fn configure(&mut self, language: &str);

    /// Start one engine session
    ///
    /// Returns the event channel for the session. Fails with
    /// `AlreadyStarted` if a session is already live.
    async fn start(&mut self) -> Result<mpsc::Receiver<EngineEvent>, EngineError>;

    /// Stop gracefully; the engine may flush final results before emitting
    /// the terminal `Ended`
    async fn stop(&mut self);

    /// Tear down immediately; suppresses further events from this session
    async fn abort(&mut self);

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// Speech backend factory
pub struct SpeechBackendFactory;

impl SpeechBackendFactory {
    /// Create a speech backend from recognition configuration
    ///
    /// An unknown or absent provider yields an `Unsupported` error; callers
    /// turn that into the controller's terminal unsupported state instead of
    /// failing startup.
    pub fn create(config: &RecognitionConfig) -> Result<Box<dyn SpeechBackend>, EngineError> {
        match config.provider.as_str() {
            "replay" => {
                let script = config.script.as_deref().ok_or_else(|| {
                    EngineError::new(
                        EngineErrorKind::Unknown,
                        "replay provider requires recognition.script",
                    )
                })?;
                let engine = ReplayEngine::from_file(script).map_err(|e| {
                    EngineError::new(
                        EngineErrorKind::Unknown,
                        format!("failed to load recognition script: {}", e),
                    )
                })?;
                Ok(Box::new(engine))
            }
            "none" => Err(EngineError::unsupported(
                "no speech recognition provider configured; supported providers: replay",
            )),
            other => Err(EngineError::unsupported(format!(
                "speech recognition provider '{}' is not available; supported providers: replay",
                other
            ))),
        }
    }
}
