//! Composer index parsing (catalog root page).

use exn::OptionExt;
use scraper::Html;
use tracing::instrument;

use crate::blob;
use crate::consts;
use crate::error::{ErrorKind, Result};

/// Extracts every composer name from the catalog root page, in index order.
///
/// The root page embeds a single `"s1"` payload mapping alphabet letters to
/// lists of raw name strings. Buckets are walked in document order (the
/// payload map preserves insertion order), so the flattened list follows the
/// index exactly. JSON parsing already resolves embedded escape sequences,
/// so the returned names are fully decoded.
#[instrument(skip(document))]
pub fn composer_names(document: &Html) -> Result<Vec<String>> {
    let payload = blob::script_payload(document, &consts::INDEX_SCRIPT_SELECTOR, "s1")?;
    let buckets = payload.as_object().ok_or_raise(|| ErrorKind::UnexpectedShape("s1"))?;
    let mut names = Vec::new();
    for bucket in buckets.values() {
        let list = bucket.as_array().ok_or_raise(|| ErrorKind::UnexpectedShape("s1 bucket"))?;
        for name in list {
            let name = name.as_str().ok_or_raise(|| ErrorKind::UnexpectedShape("s1 entry"))?;
            names.push(name.to_string());
        }
    }
    Ok(names)
}
