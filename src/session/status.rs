use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the session controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session; ready to start
    Idle,
    /// start() accepted, waiting for the engine to come up
    Starting,
    /// Engine live, results flowing
    Listening,
    /// Stopped by the user; transcript retained
    Paused,
    /// Transparent engine restart in progress
    Restarting,
    /// Recovering from a transient engine error
    Retrying,
    /// No recognition engine available; terminal
    Unsupported,
}

impl SessionState {
    /// States with recognition work in flight.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::Starting | Self::Listening | Self::Restarting | Self::Retrying
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Listening => "listening",
            Self::Paused => "paused",
            Self::Restarting => "restarting",
            Self::Retrying => "retrying",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// One dictation session as started by the user
///
/// A session survives transparent engine restarts; `engine_restarts` counts
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSession {
    /// Unique session identifier
    pub id: String,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// When the session was stopped; None while active
    pub ended_at: Option<DateTime<Utc>>,

    /// Recognition language for this session
    pub language: String,

    /// Seconds actually spent listening
    pub duration_secs: u64,

    /// Transparent engine restarts within this session
    pub engine_restarts: u32,
}

impl RecordingSession {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            id: format!("rec-{}", uuid::Uuid::new_v4()),
            started_at: Utc::now(),
            ended_at: None,
            language: language.into(),
            duration_secs: 0,
            engine_restarts: 0,
        }
    }
}

/// Snapshot of controller state, published on every change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Current lifecycle state
    pub state: SessionState,

    /// The current (or most recent) session record
    pub session: Option<RecordingSession>,

    /// Volatile interim text
    pub interim: String,

    /// Committed segments so far
    pub segments_committed: usize,

    /// Word count of the full transcript
    pub word_count: usize,

    /// Most recent surfaced error; cleared on the next successful start
    pub last_error: Option<String>,

    /// Consecutive failed engine launches (diagnostic)
    pub retry_attempts: u32,
}

impl SessionStatus {
    pub(crate) fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            session: None,
            interim: String::new(),
            segments_committed: 0,
            word_count: 0,
            last_error: None,
            retry_attempts: 0,
        }
    }

    pub(crate) fn unsupported(message: &str) -> Self {
        Self {
            state: SessionState::Unsupported,
            last_error: Some(message.to_string()),
            ..Self::idle()
        }
    }
}
