//! The fetch-and-cache transport the crawler consumes.
//!
//! The crawl core never talks HTTP directly; it goes through the [`Fetcher`]
//! trait, which hides caching, cookie/session setup, and retry behaviour.
//! [`HttpFetcher`] is the production implementation; [`mock::MockFetcher`]
//! serves tests.

mod cache;
mod client;
pub mod error;
pub mod mock;

use std::borrow::Cow;

use url::Url;

pub use crate::cache::PageCache;
pub use crate::client::{HttpFetcher, RetryPolicy};
use crate::error::Result;

/// Per-request options.
///
/// `cache_key` makes cache addressing explicit: a request may be stored and
/// looked up under a stable key different from the (query-heavy, redirecting)
/// request URL. This replaces any notion of a "next request cache URL"
/// side-channel on the transport itself.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Serve from / store into the page cache.
    pub use_cache: bool,
    /// Cache under this key instead of the request URL.
    pub cache_key: Option<Url>,
    /// Value for the `Accept` request header.
    pub accept: Option<String>,
}

impl FetchOptions {
    /// Cacheable request, keyed by its own URL.
    pub fn cached() -> Self {
        Self { use_cache: true, ..Self::default() }
    }

    /// Cacheable request stored under an explicit stable key.
    pub fn cached_as(key: Url) -> Self {
        Self { use_cache: true, cache_key: Some(key), ..Self::default() }
    }

    /// Cache-bypassing request; used for binary downloads, which are large,
    /// one-shot, and must never displace catalog pages in the cache.
    pub fn uncached() -> Self {
        Self::default()
    }

    /// Sets the `Accept` request header.
    pub fn accept(mut self, mime: impl Into<String>) -> Self {
        self.accept = Some(mime.into());
        self
    }
}

/// A completed fetch: final status, the URL the response actually came from
/// after redirects, and the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub final_url: Url,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Body decoded as UTF-8, lossily. Catalog pages are ASCII-safe; artifact
    /// bodies never go through here.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// A blocking fetch-and-cache service.
///
/// Implementations apply timeout, retry with backoff, and caching internally;
/// callers only choose per-request options. Every call blocks until the
/// response is complete; there is no concurrency anywhere in the transport.
pub trait Fetcher {
    fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<Response>;
}
