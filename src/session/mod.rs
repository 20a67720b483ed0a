//! Dictation session management
//!
//! This module provides the session controller that keeps continuous
//! dictation alive on top of a speech engine with bounded sessions:
//! - State machine over idle/listening/paused and the recovery states
//! - Planned engine restarts before the engine's own cutoff
//! - Retry with linear backoff for transient engine errors
//! - Status snapshots and watch-based change notification

mod config;
mod controller;
mod status;

pub use config::SessionConfig;
pub use controller::{ControllerHandle, SessionError};
pub use status::{RecordingSession, SessionState, SessionStatus};
