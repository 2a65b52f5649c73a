//! Top-level run errors.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A run error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for the crawl run.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories for the whole run.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Configuration could not be loaded.
    #[display("configuration error")]
    Config,
    /// The page cache could not be initialized.
    #[display("page cache initialization failed")]
    Cache,
    /// A catalog listing failed in a way that cannot be skipped (extraction
    /// failure or schema drift).
    #[display("catalog traversal failed")]
    Catalog,
    /// The score store failed.
    #[display("score storage failed")]
    Storage,
    /// More than one on-disk file matches `IMSLP<id>*`: the dedup state is
    /// ambiguous and requires manual cleanup before another run. The message
    /// carries the full conflicting file list.
    #[display("ambiguous local state for IMSLP{id}: conflicting files {files:?}")]
    AmbiguousState {
        id: u64,
        files: Vec<PathBuf>,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Catalog)
    }
}
