//! Speech engine integration
//!
//! This module provides the `SpeechBackend` abstraction over continuous
//! recognition engines:
//! - The event contract per engine session (started, result batches, one
//!   terminal end or failure)
//! - The error taxonomy the session controller keys its recovery on
//! - A replay engine that plays scripted timelines for batch runs and demos

mod backend;
mod error;
mod replay;

pub use backend::{EngineEvent, RecognitionResult, SpeechBackend, SpeechBackendFactory};
pub use error::{EngineError, EngineErrorKind};
pub use replay::{RecognitionScript, ReplayEngine, ScriptedEvent};
