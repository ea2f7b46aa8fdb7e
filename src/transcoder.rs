//! High-level API for turning timed-text XML into subtitle files.
//!
//! `Transcoder` wires the pieces together: parse → derive cues → encode. The whole document is
//! parsed and every cue derived before the first byte is written, so malformed input never
//! leaves partial subtitle output behind.

use std::io::{BufWriter, Write};

use tracing::{debug, warn};

use crate::cue::{CaptionCue, cues_from_document};
use crate::cue_encoder::CueEncoder;
use crate::json_array_encoder::JsonArrayEncoder;
use crate::opts::Opts;
use crate::output_type::OutputType;
use crate::srt_encoder::SrtEncoder;
use crate::timed_text::TimedTextDocument;
use crate::vtt_encoder::VttEncoder;
use crate::{Error, Result};

/// The main transcoding entry point.
///
/// It holds no state between calls, so one value can be shared freely across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transcoder;

impl Transcoder {
    pub fn new() -> Self {
        Self
    }

    /// Transcode `xml` and write the result to `w` in the format selected by `opts`.
    pub fn transcode<W: Write>(&self, xml: &str, w: W, opts: &Opts) -> Result<()> {
        let doc = TimedTextDocument::parse(xml)?;
        let cues = cues_from_document(&doc);

        debug!(
            cues = cues.len(),
            output_type = ?opts.output_type,
            "encoding captions"
        );

        let writer = BufWriter::new(w);

        // One concrete encoder per format; each is closed even when writing fails.
        match opts.output_type {
            OutputType::Srt => {
                let mut encoder = SrtEncoder::new(writer);
                let run_res = write_cues(&cues, &mut encoder);
                merge_run_and_close(run_res, encoder.close())
            }
            OutputType::Vtt => {
                let mut encoder = VttEncoder::new(writer);
                let run_res = write_cues(&cues, &mut encoder);
                merge_run_and_close(run_res, encoder.close())
            }
            OutputType::Json => {
                let mut encoder = JsonArrayEncoder::new(writer);
                let run_res = write_cues(&cues, &mut encoder);
                merge_run_and_close(run_res, encoder.close())
            }
        }
    }

    /// Transcode `xml` into an in-memory string.
    pub fn transcode_to_string(&self, xml: &str, opts: &Opts) -> Result<String> {
        let mut out = Vec::with_capacity(xml.len());
        self.transcode(xml, &mut out, opts)?;
        String::from_utf8(out)
            .map_err(|err| Error::msg(format!("encoder produced invalid UTF-8: {err}")))
    }
}

/// Convert a timed-text XML document into a complete SRT document.
///
/// Returns the empty string when `body` holds no paragraphs. Fails with
/// [`Error::MalformedDocument`] for unparsable XML, a missing `body`, or bad paragraph timing.
pub fn transcode(xml: &str) -> Result<String> {
    Transcoder::new().transcode_to_string(xml, &Opts::default())
}

fn write_cues<E: CueEncoder>(cues: &[CaptionCue], encoder: &mut E) -> Result<()> {
    for cue in cues {
        encoder.write_cue(cue)?;
    }
    Ok(())
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(error = %close_err, "failed to close encoder after write error");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<timedtext format="3">
<body>
<p t="5000" d="25000"><s>Hello</s><s> world</s></p>
<p t="8000" d="10000">Tom &amp;amp; Jerry</p>
</body>
</timedtext>"#;

    #[test]
    fn transcodes_to_srt_by_default() -> anyhow::Result<()> {
        assert_eq!(
            transcode(DOC)?,
            "1\n00:00:05,000 --> 00:00:07,500\nHello world\n\n\
             2\n00:00:08,000 --> 00:00:09,000\nTom & Jerry"
        );
        Ok(())
    }

    #[test]
    fn honours_output_type() -> anyhow::Result<()> {
        let vtt = Transcoder::new().transcode_to_string(
            DOC,
            &Opts {
                output_type: OutputType::Vtt,
            },
        )?;
        assert!(vtt.starts_with("WEBVTT\n\n1\n00:00:05.000 --> 00:00:07.500\nHello world\n"));

        let json = Transcoder::new().transcode_to_string(
            DOC,
            &Opts {
                output_type: OutputType::Json,
            },
        )?;
        let parsed: serde_json::Value = serde_json::from_str(&json)?;
        assert_eq!(parsed[1]["text"], "Tom & Jerry");
        Ok(())
    }

    #[test]
    fn malformed_input_writes_nothing() {
        let mut out = Vec::new();
        let err = Transcoder::new()
            .transcode(
                r#"<tt><body><p t="1">ok</p><p>no start</p></body></tt>"#,
                &mut out,
                &Opts::default(),
            )
            .unwrap_err();
        assert!(err.is_malformed_document());
        assert!(out.is_empty());
    }

    #[test]
    fn empty_body_gives_empty_output_for_every_format() -> anyhow::Result<()> {
        let empty = "<timedtext><body></body></timedtext>";
        assert_eq!(transcode(empty)?, "");

        let vtt = Transcoder::new().transcode_to_string(
            empty,
            &Opts {
                output_type: OutputType::Vtt,
            },
        )?;
        assert_eq!(vtt, "");

        let json = Transcoder::new().transcode_to_string(
            empty,
            &Opts {
                output_type: OutputType::Json,
            },
        )?;
        assert_eq!(json, "[]");
        Ok(())
    }
}
