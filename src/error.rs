//! Error types for trackforge.
//!
//! [`Error`] is the run-level taxonomy reported back to the requester. The
//! narrower [`ValidationError`], [`PublishError`] and [`SubmissionError`]
//! come from individual stages.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that end a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request was malformed; nothing was acquired.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The requester declined the confirmation prompt.
    #[error("upload was declined")]
    Declined,

    /// Nobody answered the confirmation prompt in time.
    #[error("confirmation timed out")]
    TimedOut,

    /// A source file could not be fetched.
    #[error("download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    /// The encoder failed; `message` carries its diagnostic output.
    #[error("transcode failed: {message}")]
    Transcode { message: String },

    /// A publish target rejected the content.
    ///
    /// `published` lists URLs other targets produced before the failure was
    /// examined, so the requester knows what already went live.
    #[error("publishing to {target} failed: {message}")]
    Publish {
        target: String,
        message: String,
        published: Vec<String>,
    },

    /// The confirmation prompt could not be shown.
    #[error("chat surface error: {message}")]
    Surface { message: String },

    /// Scratch storage could not be prepared.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a download error.
    pub fn download(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the run ended before any resources were acquired.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Declined | Error::TimedOut)
    }
}

impl From<trackforge_av::Error> for Error {
    fn from(err: trackforge_av::Error) -> Self {
        Error::Transcode {
            message: err.to_string(),
        }
    }
}

/// Reasons an incoming request is rejected before anything happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("unsupported {kind} file {filename:?}: expected one of {}", .allowed.join(", "))]
    UnsupportedExtension {
        kind: &'static str,
        filename: String,
        allowed: &'static [&'static str],
    },
}

/// Failure of a single publish target.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The platform answered but did not accept the upload.
    #[error("platform rejected upload ({status}): {payload}")]
    Rejected { status: u16, payload: String },

    /// The platform's response could not be understood.
    #[error("unexpected platform response: {0}")]
    InvalidResponse(String),

    /// The target needs an artifact the pipeline did not produce.
    #[error("missing {0} artifact")]
    MissingArtifact(&'static str),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failure of the final site ingestion.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("site rejected submission ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("site request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid signing key")]
    InvalidKey,
}
