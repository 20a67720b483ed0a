// Export Formats Example: one transcript rendered four ways
//
// Builds a small multi-speaker transcript by hand, spreads the segment
// timestamps out so the subtitle cues are visible, and prints the txt,
// srt, vtt, and json renditions.

use anyhow::Result;
use dicta::export::{render, ExportOptions, TranscriptFormat};
use dicta::transcript::TranscriptionSegment;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut segments = vec![
        TranscriptionSegment::new(
            "Welcome to the weekly planning call.",
            0.95,
            Some("Ana".to_string()),
        ),
        TranscriptionSegment::new("Thanks, glad to be here.", 0.9, Some("Ben".to_string())),
        TranscriptionSegment::new("Let's start with the roadmap.", 0.92, Some("Ana".to_string())),
    ];
    segments[1].timestamp = segments[0].timestamp + chrono::Duration::seconds(4);
    segments[2].timestamp = segments[0].timestamp + chrono::Duration::seconds(9);

    let options = ExportOptions::default();
    for format in [
        TranscriptFormat::Txt,
        TranscriptFormat::Srt,
        TranscriptFormat::Vtt,
        TranscriptFormat::Json,
    ] {
        let artifact = render(&segments, format, &options)?;
        info!("📄 {} ({})", artifact.filename, artifact.content_type);
        println!("{}\n", artifact.body);
    }

    Ok(())
}
