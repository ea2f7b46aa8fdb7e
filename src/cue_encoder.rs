use crate::Result;
use crate::cue::CaptionCue;

/// A sink that serializes caption cues into some subtitle format.
///
/// `close` must be idempotent, and writing after `close` is an error.
pub trait CueEncoder {
    fn write_cue(&mut self, cue: &CaptionCue) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
