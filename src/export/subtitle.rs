//! SRT and WebVTT rendering
//!
//! Dictation segments carry wall-clock timestamps but no audio-aligned
//! durations, so cues are synthesized: each segment becomes one cue whose
//! start is its offset from the first segment and whose span is a fixed
//! per-cue length.

use chrono::{DateTime, Utc};

use crate::transcript::TranscriptionSegment;

/// Render segments as SubRip (.srt).
pub fn render_srt(segments: &[TranscriptionSegment], cue_seconds: u32) -> String {
    let base = match segments.first() {
        Some(first) => first.timestamp,
        None => return String::new(),
    };
    let span_ms = u64::from(cue_seconds) * 1000;

    let mut out = String::new();
    for (index, segment) in segments.iter().enumerate() {
        let start = offset_ms(base, segment.timestamp);
        let end = start + span_ms;

        out.push_str(&format!("{}\n", index + 1));
        out.push_str(&format!(
            "{} --> {}\n",
            srt_timestamp(start),
            srt_timestamp(end)
        ));
        match &segment.speaker {
            Some(speaker) => out.push_str(&format!("{}: {}\n\n", speaker, segment.text)),
            None => out.push_str(&format!("{}\n\n", segment.text)),
        }
    }
    out
}

/// Render segments as WebVTT (.vtt).
pub fn render_vtt(segments: &[TranscriptionSegment], cue_seconds: u32) -> String {
    let mut out = String::from("WEBVTT\n\n");
    let base = match segments.first() {
        Some(first) => first.timestamp,
        None => return out,
    };
    let span_ms = u64::from(cue_seconds) * 1000;

    for segment in segments {
        let start = offset_ms(base, segment.timestamp);
        let end = start + span_ms;

        out.push_str(&format!(
            "{} --> {}\n",
            vtt_timestamp(start),
            vtt_timestamp(end)
        ));
        match &segment.speaker {
            Some(speaker) => out.push_str(&format!("<v {}>{}</v>\n\n", speaker, segment.text)),
            None => out.push_str(&format!("{}\n\n", segment.text)),
        }
    }
    out
}

fn offset_ms(base: DateTime<Utc>, timestamp: DateTime<Utc>) -> u64 {
    (timestamp - base).num_milliseconds().max(0) as u64
}

/// `HH:MM:SS,mmm`
fn srt_timestamp(ms: u64) -> String {
    let (hours, minutes, seconds, millis) = split_ms(ms);
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// `HH:MM:SS.mmm`
fn vtt_timestamp(ms: u64) -> String {
    let (hours, minutes, seconds, millis) = split_ms(ms);
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

fn split_ms(ms: u64) -> (u64, u64, u64, u64) {
    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let seconds = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    (hours, minutes, seconds, millis)
}
