//! HTTP API server for dictation control
//!
//! This module provides a REST API over the recorder:
//! - POST /api/session/start - Start a dictation session
//! - POST /api/session/stop - Stop the current session
//! - POST /api/session/clear - Empty the transcript
//! - GET /api/session/status - Controller status snapshot
//! - GET /api/transcript - Transcript text, interim, and segments
//! - GET /api/transcript/export - Download as txt/srt/vtt/json
//! - POST /api/transcript/copy - Clipboard copy with manual fallback
//! - POST /api/transcript/save - Save to the library (auth-gated)
//! - POST /api/auth/login, /api/auth/logout - Token sign-in
//! - GET /api/library, /api/library/:id - Saved transcripts
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
