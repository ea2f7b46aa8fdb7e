/// The supported output formats for transcoded captions.
///
/// With the `cli` feature this doubles as a `clap` value enum, so the CLI and library share
/// one representation. Each variant maps to a concrete `CueEncoder` implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// SubRip subtitles.
    #[default]
    Srt,

    /// WebVTT subtitles.
    Vtt,

    /// A JSON array of cues.
    Json,
}

impl OutputType {
    /// File extension (without the dot) conventionally used for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Json => "json",
        }
    }
}
