//! Clipboard hand-off
//!
//! Copying the transcript is best-effort: when the platform clipboard is
//! missing or refuses, the text is handed back to the caller for manual
//! copying instead of failing the request.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Result of a copy request
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", content = "text", rename_all = "snake_case")]
pub enum CopyOutcome {
    /// Text landed on the system clipboard
    Copied,
    /// No clipboard; here is the text to copy by hand
    Manual(String),
}

/// Headless default: there is no clipboard to copy to.
pub struct NoopClipboard;

impl Clipboard for NoopClipboard {
    fn copy(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable(
            "no system clipboard on this host".to_string(),
        ))
    }
}

/// Copy `text`, degrading to the manual hand-back on failure.
pub fn copy_with_fallback(clipboard: &dyn Clipboard, text: &str) -> CopyOutcome {
    match clipboard.copy(text) {
        Ok(()) => CopyOutcome::Copied,
        Err(e) => {
            warn!("Clipboard copy failed, returning text for manual copy: {}", e);
            CopyOutcome::Manual(text.to_string())
        }
    }
}
