//! Application-wide error types.
//!
//! Every pipeline stage returns [`Result`]. The orchestrator turns any
//! [`Error`] into a progress message and a failed job outcome, so errors
//! never cross a job boundary. The CLI binary uses `anyhow` on top.
//!
//! # Taxonomy
//!
//! - [`Error::Parse`]: the link has no trailing song ID (user-correctable)
//! - [`Error::Network`] / [`Error::Remote`]: transport failure or non-200 status
//! - [`Error::EmptyResult`] / [`Error::MissingField`] / [`Error::Payload`]: malformed API data
//! - [`Error::Write`]: filesystem failure
//! - [`Error::UnsupportedFormat`]: the notation decoder rejected the file
//! - [`Error::NoDrumTrack`]: no percussion track in the document
//! - [`Error::Spawn`]: the job thread could not be started
//!
//! Config file problems are [`crate::config::ConfigError`]; loading never
//! fails, so they never reach a job.

use std::path::PathBuf;

use crate::notation::DecodeError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level pipeline error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The link does not end in `s<digits>`
    #[error("Could not parse Songsterr ID from link: {0}")]
    Parse(String),

    /// Request could not be sent, timed out, or the body stream broke
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with something other than 200
    #[error("HTTP {status} from {url}")]
    Remote { status: u16, url: String },

    /// Revisions array was empty
    #[error("No revisions found for song ID {0}")]
    EmptyResult(String),

    /// Latest revision has no usable `source` field
    #[error("No 'source' found in the latest revision for song ID {0}")]
    MissingField(String),

    /// Response body was not the expected JSON shape
    #[error("Malformed response: {0}")]
    Payload(String),

    /// Filesystem failure while creating, writing or saving
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Notation decoder rejected the downloaded bytes
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(#[from] DecodeError),

    /// No track matched the drum criteria
    #[error("No drum track found in the downloaded file")]
    NoDrumTrack,

    /// Job thread could not be started
    #[error("Failed to start job thread: {0}")]
    Spawn(String),
}

impl Error {
    /// Create a write error for `path`.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a network error from any displayable cause.
    pub fn network(cause: impl std::fmt::Display) -> Self {
        Self::Network(cause.to_string())
    }

    /// Whether the user can fix this by correcting their input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}
