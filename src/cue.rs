use serde::Serialize;
use tracing::debug;

use crate::text::normalize_caption_text;
use crate::timed_text::{Paragraph, TimedTextDocument};

/// One caption entry, ready to be encoded.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CaptionCue {
    /// 1-based position in document order.
    pub sequence_number: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

impl CaptionCue {
    fn from_paragraph(sequence_number: usize, paragraph: &Paragraph) -> Self {
        let start_seconds = paragraph.start_seconds();
        let end_seconds = start_seconds + paragraph.duration_seconds();

        let mut text = normalize_caption_text(&paragraph.rendered_text());
        // The separator in front of the first run is not caption text.
        if !paragraph.runs.is_empty() && text.starts_with(' ') {
            text.remove(0);
        }

        Self {
            sequence_number,
            start_seconds,
            end_seconds,
            text,
        }
    }
}

/// Derive cues from a parsed document.
///
/// Cues keep document order and are numbered from 1; they are never re-sorted by time.
pub fn cues_from_document(doc: &TimedTextDocument) -> Vec<CaptionCue> {
    let cues: Vec<CaptionCue> = doc
        .paragraphs
        .iter()
        .enumerate()
        .map(|(i, p)| CaptionCue::from_paragraph(i + 1, p))
        .collect();

    debug!(cues = cues.len(), "derived caption cues");
    cues
}
