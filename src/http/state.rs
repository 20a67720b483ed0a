use std::sync::Arc;

use crate::recorder::Recorder;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The one recorder this service runs
    pub recorder: Arc<Recorder>,
}

impl AppState {
    pub fn new(recorder: Arc<Recorder>) -> Self {
        Self { recorder }
    }
}
