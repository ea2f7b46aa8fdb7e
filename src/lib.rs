//! `caption2srt` — convert segment-based timed-text XML captions into SubRip subtitles.
//!
//! This crate provides:
//! - A tolerant timed-text parser (`<body>` → `<p t d>` → `<s>` runs)
//! - Caption text normalization and exact SRT/WebVTT timestamp formatting
//! - Pluggable output encoders (SRT, WebVTT, JSON)
//!
//! Everything is a pure, stateless conversion: no I/O beyond the writer you hand in, and no
//! partial output when the input is malformed.
//!
//! ```
//! let xml = r#"<timedtext><body><p t="5000" d="25000"><s>Hello</s><s>world</s></p></body></timedtext>"#;
//! let srt = caption2srt::transcode(xml)?;
//! assert_eq!(srt, "1\n00:00:05,000 --> 00:00:07,500\nHello world");
//! # Ok::<(), caption2srt::Error>(())
//! ```

mod error;
pub use error::{Error, Result};

// High-level API (most consumers should start here).
pub mod opts;
pub mod transcoder;
pub use transcoder::{Transcoder, transcode};

// Input parsing and cue derivation.
pub mod cue;
pub mod text;
pub mod timed_text;
pub mod timestamp;
pub use timestamp::format_srt_timestamp;

// Output selection and encoder interfaces.
pub mod cue_encoder;
pub mod file_name;
pub mod output_type;

// Output encoders that serialize cues into various formats.
pub mod json_array_encoder;
pub mod srt_encoder;
pub mod vtt_encoder;

// Logging configuration for binaries.
#[cfg(feature = "logging")]
pub mod logging;
