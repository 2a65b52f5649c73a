//! Fetch Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;

/// A fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[display("transport error fetching {url}: {message}")]
    Transport {
        url: String,
        message: String,
    },
    /// The retry budget ran out on a retryable condition.
    #[display("retries exhausted after {attempts} attempts: {url}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
    },
    /// The server reported a final URL that does not parse.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// Underlying I/O error (response body, cache files).
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// The page cache could not persist an entry.
    #[display("page cache error: {_0}")]
    Cache(#[error(not(source))] String),
}

impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Io(_))
    }
}
