use std::io::Write;

use crate::cue::CaptionCue;
use crate::cue_encoder::CueEncoder;
use crate::timestamp::format_vtt_timestamp;
use crate::{Error, Result};

/// A `CueEncoder` that writes cues in WebVTT format.
///
/// The `WEBVTT` header is written lazily on the first cue, so a document without cues
/// produces no output. Sequence numbers become cue identifiers.
pub struct VttEncoder<W: Write> {
    w: W,
    started: bool,
    closed: bool,
}

impl<W: Write> VttEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            closed: false,
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            // Mandatory header line followed by a blank line.
            self.w.write_all(b"WEBVTT\n\n")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> CueEncoder for VttEncoder<W> {
    fn write_cue(&mut self, cue: &CaptionCue) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write cue: encoder is already closed"));
        }

        self.start_if_needed()?;

        let start = format_vtt_timestamp(cue.start_seconds);
        let end = format_vtt_timestamp(cue.end_seconds);

        writeln!(self.w, "{}", cue.sequence_number)?;
        writeln!(self.w, "{start} --> {end}")?;

        // An empty payload line would end the cue early, so blank cues get no text line.
        if !cue.text.trim().is_empty() {
            writeln!(self.w, "{}", cue.text)?;
        }
        writeln!(self.w)?;

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}
