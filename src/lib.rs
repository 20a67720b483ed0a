pub mod auth;
pub mod clipboard;
pub mod config;
pub mod engine;
pub mod export;
pub mod http;
pub mod library;
pub mod recorder;
pub mod session;
pub mod transcript;

pub use auth::{AuthGate, OpenAccess, TokenAuth, User};
pub use clipboard::{Clipboard, CopyOutcome, NoopClipboard};
pub use config::Config;
pub use engine::{
    EngineError, EngineErrorKind, EngineEvent, RecognitionResult, ReplayEngine, SpeechBackend,
    SpeechBackendFactory,
};
pub use export::{ExportArtifact, ExportOptions, TranscriptFormat};
pub use http::{create_router, AppState};
pub use library::{FileLibrary, TranscriptRecord, TranscriptStore, TranscriptSummary};
pub use recorder::{Collaborators, Recorder, SaveError};
pub use session::{
    ControllerHandle, RecordingSession, SessionConfig, SessionError, SessionState, SessionStatus,
};
pub use transcript::{SharedTranscript, TranscriptConfig, TranscriptSnapshot, TranscriptionSegment};
