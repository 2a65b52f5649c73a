use url::Url;

/// Top-level catalog entity; root of the hierarchy. Immutable, scoped to one
/// traversal pass, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composer {
    /// Unique within the index; duplicates across letter buckets resolve
    /// last-write-wins.
    pub name: String,
    pub url: Url,
}

/// A named composition or collection owned by a composer, grouped under a
/// relation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Work {
    pub title: String,
    pub url: Url,
}

/// A single downloadable candidate under a work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafEntry {
    pub title: String,
    /// Unique within the work; the on-disk dedup key (`IMSLP<id>*`).
    pub numeric_id: u64,
    pub candidate_url: Url,
}

/// Outcome of resolving a leaf entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Score {
    /// The binary artifact; `filename` is the final resolved URL's last path
    /// segment.
    Artifact {
        filename: String,
        content: Vec<u8>,
    },
    /// Copyright-pending or missing. A normal terminal outcome.
    Unavailable,
}
