//! Transcript export
//!
//! Renders committed segments into downloadable documents: plain text,
//! SubRip subtitles, WebVTT subtitles, and structured JSON.

mod subtitle;

pub use subtitle::{render_srt, render_vtt};

use std::str::FromStr;

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transcript::TranscriptionSegment;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptFormat {
    Txt,
    Srt,
    Vtt,
    Json,
}

#[derive(Debug, Error)]
#[error("unknown export format '{0}' (expected txt, srt, vtt, or json)")]
pub struct UnknownFormat(String);

impl FromStr for TranscriptFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Txt),
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            "json" => Ok(Self::Json),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

impl TranscriptFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Txt => "text/plain; charset=utf-8",
            Self::Srt => "application/x-subrip",
            Self::Vtt => "text/vtt",
            Self::Json => "application/json",
        }
    }
}

/// Export tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Synthesized length of each subtitle cue
    #[serde(default = "default_cue_seconds")]
    pub cue_seconds: u32,
}

fn default_cue_seconds() -> u32 {
    3
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            cue_seconds: default_cue_seconds(),
        }
    }
}

/// A rendered export ready to hand to a download or a file
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Render segments into the requested format.
pub fn render(
    segments: &[TranscriptionSegment],
    format: TranscriptFormat,
    options: &ExportOptions,
) -> anyhow::Result<ExportArtifact> {
    let body = match format {
        TranscriptFormat::Txt => render_txt(segments),
        TranscriptFormat::Srt => subtitle::render_srt(segments, options.cue_seconds),
        TranscriptFormat::Vtt => subtitle::render_vtt(segments, options.cue_seconds),
        TranscriptFormat::Json => {
            serde_json::to_string_pretty(segments).context("Failed to serialize transcript")?
        }
    };

    Ok(ExportArtifact {
        filename: suggested_filename(format),
        content_type: format.content_type(),
        body,
    })
}

fn render_txt(segments: &[TranscriptionSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn suggested_filename(format: TranscriptFormat) -> String {
    format!(
        "transcript-{}.{}",
        Utc::now().format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("srt".parse::<TranscriptFormat>().unwrap(), TranscriptFormat::Srt);
        assert_eq!("TXT".parse::<TranscriptFormat>().unwrap(), TranscriptFormat::Txt);
        assert!("docx".parse::<TranscriptFormat>().is_err());
    }

    #[test]
    fn test_txt_joins_segments_with_spaces() {
        let segments = vec![
            TranscriptionSegment::new("Hello world", 0.9, None),
            TranscriptionSegment::new("this is dictation", 0.9, None),
        ];
        assert_eq!(render_txt(&segments), "Hello world this is dictation");
    }

    #[test]
    fn test_json_export_is_parseable() {
        let segments = vec![TranscriptionSegment::new("Hello", 0.9, Some("Ana".into()))];
        let artifact = render(&segments, TranscriptFormat::Json, &ExportOptions::default()).unwrap();

        let parsed: Vec<TranscriptionSegment> = serde_json::from_str(&artifact.body).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].text, "Hello");
        assert_eq!(parsed[0].speaker.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_filename_carries_extension() {
        let artifact = render(&[], TranscriptFormat::Vtt, &ExportOptions::default()).unwrap();
        assert!(artifact.filename.starts_with("transcript-"));
        assert!(artifact.filename.ends_with(".vtt"));
        assert_eq!(artifact.content_type, "text/vtt");
    }
}
