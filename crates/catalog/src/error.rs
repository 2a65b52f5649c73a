//! Catalog Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. The coordinator routes on these kinds: fetch failures
//! skip to the next sibling entry, extraction failures and schema drift abort
//! the traversal, resolution failures skip the single score.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Transport failure after the fetcher's retry budget; fatal only for
    /// the URL being fetched.
    #[display("failed to fetch catalog page")]
    Fetch,
    /// The page template no longer carries the embedded data we expect.
    /// Sibling pages share the template, so the enclosing level is lost.
    #[display("failed to extract embedded catalog data")]
    Extract,
    /// A relation-kind code outside the fixed table: the catalog schema
    /// drifted. Fatal, surfaced immediately.
    #[display("unknown relation kind: {_0}")]
    UnknownRelation(#[error(not(source))] String),
    /// An interstitial download page did not have the expected structure;
    /// fatal only for the single score being resolved.
    #[display("unexpected interstitial page structure")]
    Resolution,
    /// A URL assembled from catalog data does not parse.
    #[display("invalid catalog URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch)
    }
}
