//! Interstitial download-page classification.
//!
//! The final binary fetch often lands on an HTML gateway page instead of the
//! file itself: a copyright-review error page, a mirror's countdown page with
//! the real link in a table cell, or the primary host's wait element carrying
//! the target in a data attribute.

use exn::OptionExt;
use scraper::Html;
use tracing::instrument;

use crate::consts;
use crate::error::{ErrorKind, Result};

/// Response-body prefixes that mark a body as an interstitial HTML page
/// rather than the binary artifact.
const MARKUP_SIGNATURES: [&[u8]; 3] = [b"<!DOCT", b"\n<!DOC", b"<html>"];

/// What an interstitial page resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interstitial {
    /// The page title starts with `Error`: the file is pending copyright
    /// review or missing. A normal terminal outcome, not a failure.
    Unavailable,
    /// Raw href of the real download link from a mirror's table-cell anchor;
    /// must be rewritten against the mirror base URL.
    MirrorLink(String),
    /// Absolute target URL from the primary host's wait element.
    DirectLink(String),
}

/// Returns `true` if the leading bytes match a known HTML page signature.
pub fn looks_like_markup(body: &[u8]) -> bool {
    MARKUP_SIGNATURES.iter().any(|signature| body.starts_with(signature))
}

/// Classifies an interstitial page.
///
/// `on_mirror` selects the mirror-specific redirect shape (table-cell anchor)
/// over the primary host's wait element; the caller decides it from the
/// response's final URL.
///
/// # Errors
///
/// [`ErrorKind::MissingElement`] when the expected link carrier is absent.
/// Fatal only for the single score being resolved.
#[instrument(skip(document))]
pub fn classify(document: &Html, on_mirror: bool) -> Result<Interstitial> {
    if let Some(title) = document.select(&consts::PAGE_TITLE_SELECTOR).next() {
        let title = title.text().collect::<String>();
        if title.trim_start().starts_with("Error") {
            return Ok(Interstitial::Unavailable);
        }
    }
    if on_mirror {
        let anchor = document
            .select(&consts::MIRROR_LINK_SELECTOR)
            .next()
            .ok_or_raise(|| ErrorKind::MissingElement("tr > td > center > a"))?;
        let href = anchor
            .value()
            .attr("href")
            .ok_or_raise(|| ErrorKind::MissingElement("mirror anchor href"))?;
        Ok(Interstitial::MirrorLink(href.to_string()))
    } else {
        let wait = document
            .select(&consts::WAIT_SPAN_SELECTOR)
            .next()
            .ok_or_raise(|| ErrorKind::MissingElement("span#sm_dl_wait"))?;
        let target = wait
            .value()
            .attr("data-id")
            .ok_or_raise(|| ErrorKind::MissingElement("span#sm_dl_wait data-id"))?;
        Ok(Interstitial::DirectLink(target.to_string()))
    }
}
