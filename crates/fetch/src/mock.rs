//! In-memory mock fetcher for tests.
//!
//! Routes request URLs to canned responses and records every call, so tests
//! can assert both what was produced and what was (or was not) fetched.

use std::cell::RefCell;
use std::collections::HashMap;

use exn::OptionExt;
use url::Url;

use crate::error::{ErrorKind, Result};
use crate::{FetchOptions, Fetcher, Response};

/// Routable fake [`Fetcher`]. Unrouted URLs fail with a transport error,
/// which is exactly how a dead link behaves in production.
#[derive(Debug, Default)]
pub struct MockFetcher {
    routes: HashMap<String, Response>,
    calls: RefCell<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a canned response for `url`.
    pub fn route(mut self, url: &str, response: Response) -> Self {
        self.routes.insert(url.to_string(), response);
        self
    }

    /// Registers a 200 HTML page served from its own URL.
    pub fn page(self, url: &str, body: &str) -> Self {
        let response = Response {
            status: 200,
            final_url: Url::parse(url).expect("mock route URL must parse"),
            body: body.as_bytes().to_vec(),
        };
        self.route(url, response)
    }

    /// Registers a 200 response that redirected to `final_url`.
    pub fn redirected(self, url: &str, final_url: &str, body: impl Into<Vec<u8>>) -> Self {
        let response = Response {
            status: 200,
            final_url: Url::parse(final_url).expect("mock route URL must parse"),
            body: body.into(),
        };
        self.route(url, response)
    }

    /// All request URLs seen, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// How many times `url` was requested.
    pub fn call_count(&self, url: &str) -> usize {
        self.calls.borrow().iter().filter(|seen| seen.as_str() == url).count()
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&self, url: &Url, _options: &FetchOptions) -> Result<Response> {
        self.calls.borrow_mut().push(url.to_string());
        self.routes.get(url.as_str()).cloned().ok_or_raise(|| ErrorKind::Transport {
            url: url.to_string(),
            message: "no mock route registered".to_string(),
        })
    }
}
