//! Centralized error types for mimesplit.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mimesplit library.
///
/// Every variant is fatal for a run: nothing is retried and nothing already
/// written (body text or attachment files) is rolled back.
#[derive(Error, Debug)]
pub enum SplitError {
    /// The named input message could not be opened or read.
    #[error("Cannot read input message '{path}': {source}")]
    InputUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Standard input could not be read.
    #[error("Cannot read message from standard input: {0}")]
    Stdin(#[source] std::io::Error),

    /// The current working directory could not be resolved.
    #[error("Cannot determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    /// The destination directory could not be created (and did not already exist).
    #[error("Cannot create destination directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The MIME parser could not produce a message tree.
    #[error("MIME parsing error: {0}")]
    MimeError(String),

    /// The character encoding declared for the body is not supported.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// The body bytes are not valid under the declared (or default) charset.
    #[error("Message body is not valid '{charset}' text")]
    Decode { charset: String },

    /// An attachment file could not be created or written.
    #[error("Cannot write attachment '{path}': {source}")]
    AttachmentWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing to the primary output or the diagnostic stream failed.
    #[error("Cannot write to output stream: {0}")]
    Output(#[source] std::io::Error),
}

/// Convenience alias for `Result<T, SplitError>`.
pub type Result<T> = std::result::Result<T, SplitError>;

impl SplitError {
    /// Create an `InputUnavailable` variant from a path and an `io::Error`.
    pub fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InputUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Create an `AttachmentWrite` variant from a path and an `io::Error`.
    pub fn attachment(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::AttachmentWrite {
            path: path.into(),
            source,
        }
    }
}
