//! Score resolution: leaf entry to binary artifact.

use exn::{OptionExt, ResultExt};
use imslip_extract::{Interstitial, classify, looks_like_markup};
use imslip_fetch::{FetchOptions, Fetcher, Response};
use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ErrorKind, Result};
use crate::models::{LeafEntry, Score};
use crate::walker::Catalog;

/// Hosts whose interstitial pages use the table-cell redirect shape instead
/// of the primary host's wait element.
const MIRROR_HOSTS: [&str; 2] = ["petruccimusiclibrary.ca", "imslp.eu"];
/// Mirror download links are host-relative; they resolve against this base.
const MIRROR_BASE: &str = "https://petruccimusiclibrary.ca";

/// Bodies shorter than this never carry the not-found marker; the window
/// skips the response preamble where the phrase could legitimately appear.
const NOT_FOUND_OFFSET: usize = 50;
const NOT_FOUND_MARKER: &[u8] = b"404 Not Found";

impl<F: Fetcher> Catalog<F> {
    /// Resolves a leaf entry to its binary artifact, following at most one
    /// interstitial page.
    ///
    /// Binary fetches always bypass the page cache: they are large, one-shot,
    /// and must not displace catalog pages. Copyright-pending and missing
    /// files come back as [`Score::Unavailable`], a normal outcome; only
    /// transport failures and malformed interstitial pages are errors.
    #[instrument(skip(self, entry), fields(id = entry.numeric_id, url = %entry.candidate_url))]
    pub fn resolve_score(&self, entry: &LeafEntry) -> Result<Score> {
        let first = self
            .fetcher()
            .fetch(&entry.candidate_url, &FetchOptions::uncached())
            .or_raise(|| ErrorKind::Fetch)?;
        let response = if looks_like_markup(&first.body) {
            let target = match self.interstitial_target(&first)? {
                Some(target) => target,
                None => return Ok(Score::Unavailable),
            };
            debug!(target = %target, "following interstitial to binary");
            self.fetcher()
                .fetch(&target, &FetchOptions::uncached().accept("application/pdf"))
                .or_raise(|| ErrorKind::Fetch)?
        } else {
            first
        };
        if !response.is_success() || contains_not_found(&response.body) {
            return Ok(Score::Unavailable);
        }
        let filename = final_filename(&response.final_url).ok_or_raise(|| ErrorKind::Resolution)?;
        Ok(Score::Artifact { filename, content: response.body })
    }

    /// Extracts the follow-up URL from an interstitial page, or `None` when
    /// the page is an error placeholder.
    fn interstitial_target(&self, response: &Response) -> Result<Option<Url>> {
        let document = Html::parse_document(&response.text());
        let on_mirror = response
            .final_url
            .host_str()
            .is_some_and(|host| MIRROR_HOSTS.iter().any(|mirror| host == *mirror));
        match classify(&document, on_mirror).or_raise(|| ErrorKind::Resolution)? {
            Interstitial::Unavailable => Ok(None),
            Interstitial::MirrorLink(href) => {
                let base = Url::parse(MIRROR_BASE).or_raise(|| ErrorKind::InvalidUrl(MIRROR_BASE.to_string()))?;
                let url = base.join(&href).ok().ok_or_raise(|| ErrorKind::InvalidUrl(href))?;
                Ok(Some(url))
            },
            Interstitial::DirectLink(target) => {
                let url = Url::parse(&target).ok().ok_or_raise(|| ErrorKind::InvalidUrl(target))?;
                Ok(Some(url))
            },
        }
    }
}

/// Scans for the literal not-found marker past the offset window.
fn contains_not_found(body: &[u8]) -> bool {
    body.get(NOT_FOUND_OFFSET..)
        .is_some_and(|window| window.windows(NOT_FOUND_MARKER.len()).any(|chunk| chunk == NOT_FOUND_MARKER))
}

/// The last non-empty path segment of the final resolved URL.
fn final_filename(url: &Url) -> Option<String> {
    url.path_segments()?.filter(|segment| !segment.is_empty()).next_back().map(str::to_string)
}
