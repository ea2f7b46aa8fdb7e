use std::error::Error as StdError;

use thiserror::Error;

/// caption2srt's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// caption2srt's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The input could not be read as a timed-text document: broken XML, no `body`,
    /// or a paragraph with missing or non-numeric timing.
    #[error("malformed timed-text document: {0}")]
    MalformedDocument(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument(message.into())
    }

    /// Whether this error describes bad input rather than an output or usage failure.
    pub fn is_malformed_document(&self) -> bool {
        matches!(self, Self::MalformedDocument(_))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::MalformedDocument(err.to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::MalformedDocument(err.to_string())
    }
}
