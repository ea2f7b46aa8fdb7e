use std::io::Write;

use crate::cue::CaptionCue;
use crate::cue_encoder::CueEncoder;
use crate::{Error, Result};

/// A `CueEncoder` that writes cues as a single JSON array.
///
/// Example output:
/// ```json
/// [{"sequence_number":1,"start_seconds":5.0,"end_seconds":7.5,"text":"Hello world"}]
/// ```
///
/// The opening bracket is deferred until the first cue or `close`, so an empty run still
/// yields valid JSON (`[]`).
pub struct JsonArrayEncoder<W: Write> {
    w: W,
    started: bool,

    /// Number of cues written so far; drives comma placement.
    written: usize,
    closed: bool,
}

impl<W: Write> JsonArrayEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            written: 0,
            closed: false,
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"[")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> CueEncoder for JsonArrayEncoder<W> {
    fn write_cue(&mut self, cue: &CaptionCue) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write cue: encoder is already closed"));
        }

        self.start_if_needed()?;

        if self.written > 0 {
            self.w.write_all(b",")?;
        }
        serde_json::to_writer(&mut self.w, cue)?;
        self.written += 1;

        Ok(())
    }

    /// Close the array and flush. Safe to call more than once.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.write_all(b"]")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}
