//! Extraction Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Every kind here is fatal for the page being parsed; whether it is fatal for
/// the surrounding traversal is the caller's decision.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No script node carrying embedded catalog data was found.
    #[display("no catalog data script found in document")]
    MissingScript,
    /// A guarded script was found but its JSON payload span could not be located.
    #[display("embedded data payload not found in script")]
    PayloadNotFound,
    /// The payload span was located but is not parseable JSON.
    #[display("embedded data payload is not valid JSON: {_0}")]
    MalformedPayload(#[error(not(source))] String),
    /// The payload parsed, but its value does not have the expected shape.
    #[display("unexpected payload shape for '{_0}'")]
    UnexpectedShape(#[error(not(source))] &'static str),
    /// The expected payload key is absent from every guarded script.
    #[display("payload key '{_0}' not present in any catalog script")]
    MissingKey(#[error(not(source))] &'static str),
    /// A relation-kind code outside the fixed `p1..p12` table. The catalog
    /// schema has drifted; never ignore this.
    #[display("unknown relation kind code: {_0}")]
    UnknownRelationKind(#[error(not(source))] String),
    /// A structurally required element is missing from an interstitial page.
    #[display("missing expected element: {_0}")]
    MissingElement(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The markup is either parseable or it is not; re-fetching the same
        // page yields the same document.
        false
    }
}
