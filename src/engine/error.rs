use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of engine failures.
///
/// Continuous recognition engines report errors as short codes; the kind
/// decides how the session controller reacts. Fatal kinds halt the session,
/// transient kinds are retried with backoff, benign kinds carry no signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineErrorKind {
    /// Microphone permission was denied
    PermissionDenied,
    /// The engine heard nothing during the session
    NoSpeech,
    /// No capture device is present
    NoMicrophone,
    /// Network failure between the engine and its recognition service
    Network,
    /// The session was torn down deliberately
    Aborted,
    /// start() was called while a session was already live
    AlreadyStarted,
    /// No recognition engine is available at all
    Unsupported,
    /// Anything the engine did not classify
    Unknown,
}

impl EngineErrorKind {
    /// Whether the controller should schedule an automatic relaunch.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::NoSpeech | Self::Network | Self::Unknown)
    }

    /// Deliberate aborts carry no signal and are never surfaced.
    pub fn is_benign(self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Fatal errors surface immediately and halt automatic restarts.
    pub fn is_fatal(self) -> bool {
        !self.is_retryable() && !self.is_benign()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission-denied",
            Self::NoSpeech => "no-speech",
            Self::NoMicrophone => "no-microphone",
            Self::Network => "network",
            Self::Aborted => "aborted",
            Self::AlreadyStarted => "already-started",
            Self::Unsupported => "unsupported",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error reported by a speech engine
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct EngineError {
    /// Error classification
    pub kind: EngineErrorKind,
    /// Engine-provided detail
    pub message: String,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Unsupported, message)
    }

    pub fn already_started(engine: &str) -> Self {
        Self::new(
            EngineErrorKind::AlreadyStarted,
            format!("{} engine session already started", engine),
        )
    }
}
