//! Transcript accumulation
//!
//! Final recognition results accumulate as append-only segments; interim
//! hypotheses live in a volatile buffer that is replaced wholesale on every
//! recognition event. `full_text()` is what users see: committed segments in
//! arrival order plus the trailing interim.

mod accumulator;
mod normalize;
mod segment;

pub use accumulator::{
    SharedTranscript, TranscriptAccumulator, TranscriptConfig, TranscriptSnapshot,
    DEFAULT_CONFIDENCE,
};
pub use normalize::{SegmentFilter, SpacingNormalizer};
pub use segment::TranscriptionSegment;
