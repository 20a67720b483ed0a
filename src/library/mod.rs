//! Saved-transcript library
//!
//! Persistence for finished dictations: a storage trait the recorder and
//! HTTP layer consume, plus the default JSON-file implementation.

mod file_store;
mod store;

pub use file_store::FileLibrary;
pub use store::{StoreError, TranscriptRecord, TranscriptStore, TranscriptSummary};
