//! Recorder facade
//!
//! One object wiring the speech engine, session controller, and shared
//! transcript together with the collaborators (library, auth gate,
//! clipboard). The HTTP layer and demos talk to this, not to the parts.

use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::auth::{AuthError, AuthGate, OpenAccess, TokenAuth, User};
use crate::clipboard::{copy_with_fallback, Clipboard, CopyOutcome, NoopClipboard};
use crate::config::Config;
use crate::engine::{EngineErrorKind, SpeechBackendFactory};
use crate::export::{self, ExportArtifact, ExportOptions, TranscriptFormat};
use crate::library::{
    FileLibrary, StoreError, TranscriptRecord, TranscriptStore, TranscriptSummary,
};
use crate::session::{ControllerHandle, SessionError, SessionStatus};
use crate::transcript::{SharedTranscript, TranscriptSnapshot, TranscriptionSegment};

/// Everything the recorder needs besides the controller itself
pub struct Collaborators {
    pub store: Arc<dyn TranscriptStore>,
    pub auth: Arc<dyn AuthGate>,
    pub clipboard: Arc<dyn Clipboard>,
    pub export_options: ExportOptions,
    pub default_language: String,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("sign in to save transcripts")]
    NotSignedIn,

    #[error("transcript is empty")]
    EmptyTranscript,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Recorder {
    controller: ControllerHandle,
    transcript: SharedTranscript,
    parts: Collaborators,
}

impl Recorder {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let transcript = SharedTranscript::new(config.transcript.clone());
        let session_config = config.session_config();
        let default_language = session_config.language.clone();

        let controller = match SpeechBackendFactory::create(&config.recognition) {
            Ok(engine) => ControllerHandle::spawn(engine, transcript.clone(), session_config),
            Err(err) if err.kind == EngineErrorKind::Unsupported => {
                ControllerHandle::spawn_unsupported(err.message, transcript.clone(), session_config)
            }
            Err(err) => return Err(err).context("Failed to create speech engine"),
        };

        let auth: Arc<dyn AuthGate> = match config.auth.mode.as_str() {
            "open" => Arc::new(OpenAccess),
            "token" => match &config.auth.token {
                Some(token) => Arc::new(TokenAuth::new(token.clone())),
                None => bail!("auth.mode = \"token\" requires auth.token"),
            },
            other => bail!("Unknown auth mode '{}' (expected open or token)", other),
        };

        Ok(Self {
            controller,
            transcript,
            parts: Collaborators {
                store: Arc::new(FileLibrary::new(&config.library.path)),
                auth,
                clipboard: Arc::new(NoopClipboard),
                export_options: config.export.clone(),
                default_language,
            },
        })
    }

    /// Assemble from pre-built parts.
    pub fn with_parts(
        controller: ControllerHandle,
        transcript: SharedTranscript,
        parts: Collaborators,
    ) -> Self {
        Self {
            controller,
            transcript,
            parts,
        }
    }

    pub async fn start(&self, language: Option<String>) -> Result<String, SessionError> {
        self.controller.start(language).await
    }

    pub async fn stop(&self) -> Result<SessionStatus, SessionError> {
        self.controller.stop().await
    }

    pub async fn clear(&self) -> Result<(), SessionError> {
        self.controller.clear().await
    }

    pub fn status(&self) -> SessionStatus {
        self.controller.status()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.controller.subscribe()
    }

    /// Snapshot of the committed segments.
    pub fn transcript(&self) -> Vec<TranscriptionSegment> {
        self.transcript.segments()
    }

    /// Full transcript view captured under one lock hold.
    pub fn transcript_snapshot(&self) -> TranscriptSnapshot {
        self.transcript.snapshot()
    }

    /// Committed text plus any trailing interim.
    pub fn full_text(&self) -> String {
        self.transcript.full_text()
    }

    pub fn word_count(&self) -> usize {
        self.transcript.word_count()
    }

    /// Copy the transcript to the clipboard, or hand it back for manual copy.
    pub fn copy_transcript(&self) -> CopyOutcome {
        copy_with_fallback(self.parts.clipboard.as_ref(), &self.full_text())
    }

    pub fn export(&self, format: TranscriptFormat) -> anyhow::Result<ExportArtifact> {
        let snapshot = self.transcript.snapshot();
        let mut artifact = export::render(&snapshot.segments, format, &self.parts.export_options)?;
        // Plain text carries the trailing interim, same as copy
        if format == TranscriptFormat::Txt {
            artifact.body = snapshot.text;
        }
        Ok(artifact)
    }

    /// Save the committed transcript to the library. Requires a signed-in
    /// user; the title defaults to the transcript's opening words.
    pub async fn save(&self, title: Option<String>) -> Result<String, SaveError> {
        let user = self
            .parts
            .auth
            .current_user()
            .ok_or(SaveError::NotSignedIn)?;

        let segments = self.transcript.segments();
        if segments.is_empty() {
            return Err(SaveError::EmptyTranscript);
        }

        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let word_count = text.split_whitespace().count();

        let status = self.controller.status();
        let (language, duration_secs) = match &status.session {
            Some(session) => (session.language.clone(), session.duration_secs),
            None => (self.parts.default_language.clone(), 0),
        };

        let record = TranscriptRecord {
            id: format!("tr-{}", Uuid::new_v4()),
            title: title.unwrap_or_else(|| derive_title(&text)),
            created_at: Utc::now(),
            language,
            duration_secs,
            word_count,
            text,
            segments,
        };

        let id = self.parts.store.save(&record).await?;
        info!(
            "Saved transcript {} ({} words) for {}",
            id, word_count, user.name
        );
        Ok(id)
    }

    pub async fn list_saved(&self) -> Result<Vec<TranscriptSummary>, StoreError> {
        self.parts.store.list().await
    }

    pub async fn get_saved(&self, id: &str) -> Result<TranscriptRecord, StoreError> {
        self.parts.store.get(id).await
    }

    pub fn current_user(&self) -> Option<User> {
        self.parts.auth.current_user()
    }

    pub fn login(&self, credential: &str) -> Result<User, AuthError> {
        self.parts.auth.login(credential)
    }

    pub fn logout(&self) {
        self.parts.auth.logout()
    }

    pub async fn shutdown(&self) {
        self.controller.shutdown().await;
    }
}

/// First few words of the transcript, for the default save title.
fn derive_title(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().take(6).collect();
    if words.is_empty() {
        return "Untitled dictation".to_string();
    }
    let mut title = words.join(" ");
    if text.split_whitespace().nth(6).is_some() {
        title.push('…');
    }
    title
}
