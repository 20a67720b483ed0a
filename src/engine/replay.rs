use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use super::backend::{EngineEvent, RecognitionResult, SpeechBackend};
use super::error::{EngineError, EngineErrorKind};

/// One entry in a recognition script
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptedEvent {
    /// Deliver a batch of recognition results
    Results {
        /// Delay before delivery, relative to the previous event
        after_ms: u64,
        results: Vec<RecognitionResult>,
    },
    /// Fail the engine session
    Error {
        after_ms: u64,
        error: EngineErrorKind,
        message: String,
    },
    /// End the engine session gracefully
    End { after_ms: u64 },
}

/// A scripted recognition timeline, loadable from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognitionScript {
    pub events: Vec<ScriptedEvent>,
}

impl RecognitionScript {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading recognition script: {}", path.display());

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recognition script: {}", path.display()))?;
        let script: RecognitionScript = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse recognition script: {}", path.display()))?;

        info!("Recognition script loaded: {} event(s)", script.events.len());
        Ok(script)
    }
}

/// Replays a scripted recognition timeline (batch runs, demos)
///
/// Each `start()` plays the script from the beginning. A script without a
/// terminal entry ends the session gracefully once exhausted, the same way
/// real engines cut sessions off on their own.
pub struct ReplayEngine {
    script: RecognitionScript,
    language: String,
    ctrl: Option<mpsc::UnboundedSender<ReplayCtrl>>,
}

#[derive(Debug)]
enum ReplayCtrl {
    Stop,
    Abort,
}

impl ReplayEngine {
    pub fn new(script: RecognitionScript) -> Self {
        Self {
            script,
            language: "en-US".to_string(),
            ctrl: None,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(RecognitionScript::load(path)?))
    }

    fn session_live(&self) -> bool {
        self.ctrl.as_ref().map(|c| !c.is_closed()).unwrap_or(false)
    }
}

#[async_trait::async_trait]
impl SpeechBackend for ReplayEngine {
    fn configure(&mut self, language: &str) {
        self.language = language.to_string();
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<EngineEvent>, EngineError> {
        if self.session_live() {
            return Err(EngineError::already_started(self.name()));
        }

        let (event_tx, event_rx) = mpsc::channel(32);
        let (ctrl_tx, mut ctrl_rx) = mpsc::unbounded_channel();
        let script = self.script.clone();
        let language = self.language.clone();

        tokio::spawn(async move {
            debug!("Replay session started ({})", language);

            if event_tx.send(EngineEvent::Started).await.is_err() {
                return;
            }

            for entry in script.events {
                let (delay, event) = match entry {
                    ScriptedEvent::Results { after_ms, results } => {
                        (after_ms, EngineEvent::Results(results))
                    }
                    ScriptedEvent::Error {
                        after_ms,
                        error,
                        message,
                    } => (after_ms, EngineEvent::Failed(EngineError::new(error, message))),
                    ScriptedEvent::End { after_ms } => (after_ms, EngineEvent::Ended),
                };

                tokio::select! {
                    _ = sleep(Duration::from_millis(delay)) => {}
                    ctrl = ctrl_rx.recv() => {
                        match ctrl {
                            // Graceful stop ends the session cleanly
                            Some(ReplayCtrl::Stop) | None => {
                                let _ = event_tx.send(EngineEvent::Ended).await;
                            }
                            // Abort suppresses everything, including the end
                            Some(ReplayCtrl::Abort) => {}
                        }
                        return;
                    }
                }

                let terminal = matches!(event, EngineEvent::Ended | EngineEvent::Failed(_));
                if event_tx.send(event).await.is_err() {
                    return;
                }
                if terminal {
                    debug!("Replay session finished");
                    return;
                }
            }

            // Script exhausted without a terminal entry
            let _ = event_tx.send(EngineEvent::Ended).await;
            debug!("Replay session finished");
        });

        self.ctrl = Some(ctrl_tx);
        Ok(event_rx)
    }

    async fn stop(&mut self) {
        if let Some(ctrl) = self.ctrl.take() {
            let _ = ctrl.send(ReplayCtrl::Stop);
        }
    }

    async fn abort(&mut self) {
        if let Some(ctrl) = self.ctrl.take() {
            let _ = ctrl.send(ReplayCtrl::Abort);
        }
    }

    fn name(&self) -> &str {
        "replay"
    }
}
