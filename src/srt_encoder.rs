use std::io::Write;

use crate::cue::CaptionCue;
use crate::cue_encoder::CueEncoder;
use crate::timestamp::format_srt_timestamp;
use crate::{Error, Result};

/// A `CueEncoder` that writes cues as SubRip (SRT) records.
///
/// Layout:
/// - Each record is the sequence number, the timing line, and the text line.
/// - Records are separated by exactly one blank line.
/// - The output has no leading or trailing whitespace: the final record's text line is
///   held back until `close` and written with its trailing whitespace removed (or dropped
///   entirely when nothing is left), so the result matches "join with blank lines, then trim".
/// - Writing no cues produces no output at all.
pub struct SrtEncoder<W: Write> {
    /// The underlying writer we stream SRT into.
    w: W,

    /// Text line of the most recent record, not yet written.
    pending_text: Option<String>,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    /// Create a new SRT encoder that writes to the provided writer.
    pub fn new(w: W) -> Self {
        Self {
            w,
            pending_text: None,
            closed: false,
        }
    }

    /// Consume the encoder and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.w
    }
}

impl<W: Write> CueEncoder for SrtEncoder<W> {
    fn write_cue(&mut self, cue: &CaptionCue) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write cue: encoder is already closed"));
        }

        // Another record follows, so the previous text line is written verbatim.
        if let Some(text) = self.pending_text.take() {
            write!(self.w, "\n{text}\n\n")?;
        }

        let start = format_srt_timestamp(cue.start_seconds);
        let end = format_srt_timestamp(cue.end_seconds);
        write!(self.w, "{}\n{start} --> {end}", cue.sequence_number)?;

        self.pending_text = Some(cue.text.clone());
        Ok(())
    }

    /// Write the final text line and flush. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        if let Some(text) = self.pending_text.take() {
            let text = text.trim_end();
            if !text.is_empty() {
                write!(self.w, "\n{text}")?;
            }
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}
