//! Blocking HTTP client with retry, cookies, and page caching.

use std::io::Read;
use std::thread;
use std::time::Duration;

use tracing::{debug, instrument, warn};
use url::Url;

use crate::cache::PageCache;
use crate::error::{ErrorKind, Result};
use crate::{FetchOptions, Fetcher, Response};

/// Bounded retry budget with exponential backoff, applied to transport
/// failures and to the configured transient status codes.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_factor: f64,
    pub statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 5, backoff_factor: 3.0, statuses: vec![502, 503, 504] }
    }
}

impl RetryPolicy {
    fn retries_status(&self, status: u16) -> bool {
        self.statuses.contains(&status)
    }

    /// Delay before the attempt following `attempt` (1-based):
    /// `backoff_factor * 2^(attempt - 1)` seconds.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(10);
        Duration::from_secs_f64(self.backoff_factor * f64::from(1u32 << exponent))
    }
}

/// Production [`Fetcher`]: a blocking `ureq` agent with short timeouts, fixed
/// session cookies, retry with backoff, and an optional page cache.
pub struct HttpFetcher {
    agent: ureq::Agent,
    cookie_header: String,
    retry: RetryPolicy,
    cache: Option<PageCache>,
}

impl HttpFetcher {
    /// Builds a fetcher.
    ///
    /// `cookies` are name/value pairs sent on every request; the catalog
    /// requires its locale and disclaimer cookies before any page renders
    /// with the expected structure.
    pub fn new(
        timeout: Duration,
        cookies: &[(String, String)],
        retry: RetryPolicy,
        cache: Option<PageCache>,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        let cookie_header =
            cookies.iter().map(|(name, value)| format!("{name}={value}")).collect::<Vec<_>>().join("; ");
        Self { agent, cookie_header, retry, cache }
    }

    /// One request/response exchange, redirects followed by the agent.
    fn attempt(&self, url: &Url, accept: Option<&str>) -> Result<Response> {
        let mut request = self.agent.get(url.as_str());
        if !self.cookie_header.is_empty() {
            request = request.set("Cookie", &self.cookie_header);
        }
        if let Some(accept) = accept {
            request = request.set("Accept", accept);
        }
        let response = match request.call() {
            Ok(response) => response,
            // Non-2xx statuses are still responses; the caller routes on status.
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => exn::bail!(ErrorKind::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            }),
        };
        let status = response.status();
        let final_url = Url::parse(response.get_url())
            .map_err(|_| ErrorKind::InvalidUrl(response.get_url().to_string()))?;
        let mut body = Vec::new();
        response.into_reader().read_to_end(&mut body).map_err(ErrorKind::Io)?;
        Ok(Response { status, final_url, body })
    }

    fn fetch_with_retries(&self, url: &Url, accept: Option<&str>) -> Result<Response> {
        let mut attempt = 1u32;
        loop {
            let outcome = self.attempt(url, accept);
            let out_of_budget = attempt >= self.retry.max_attempts;
            match outcome {
                Ok(response) if self.retry.retries_status(response.status) => {
                    if out_of_budget {
                        exn::bail!(ErrorKind::RetriesExhausted { url: url.to_string(), attempts: attempt });
                    }
                    warn!(url = %url, status = response.status, attempt, "transient status, backing off");
                },
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && !out_of_budget => {
                    warn!(url = %url, error = %e, attempt, "transport failure, backing off");
                },
                Err(e) => return Err(e),
            }
            thread::sleep(self.retry.delay(attempt));
            attempt += 1;
        }
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(skip(self, options), fields(use_cache = options.use_cache))]
    fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<Response> {
        let cache = options.use_cache.then_some(self.cache.as_ref()).flatten();
        let key = options.cache_key.as_ref().unwrap_or(url);
        if let Some(cache) = cache
            && let Some(hit) = cache.load(key)
        {
            debug!(key = %key, "cache hit");
            return Ok(hit);
        }
        let response = self.fetch_with_retries(url, options.accept.as_deref())?;
        if let Some(cache) = cache
            && response.is_success()
        {
            cache.store(key, &response)?;
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1, 3.0)]
    #[case(2, 6.0)]
    #[case(3, 12.0)]
    #[case(4, 24.0)]
    fn test_backoff_doubles_per_attempt(#[case] attempt: u32, #[case] seconds: f64) {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(attempt), Duration::from_secs_f64(seconds));
    }

    #[test]
    fn test_default_policy_matches_transient_statuses() {
        let policy = RetryPolicy::default();
        for status in [502, 503, 504] {
            assert!(policy.retries_status(status));
        }
        for status in [200, 301, 404, 500] {
            assert!(!policy.retries_status(status));
        }
    }

    #[test]
    fn test_cookie_header_joins_pairs() {
        let fetcher = HttpFetcher::new(
            Duration::from_secs(2),
            &[
                ("imslp_wikiLanguageSelectorLanguage".to_string(), "en".to_string()),
                ("imslpdisclaimeraccepted".to_string(), "yes".to_string()),
            ],
            RetryPolicy::default(),
            None,
        );
        assert_eq!(
            fetcher.cookie_header,
            "imslp_wikiLanguageSelectorLanguage=en; imslpdisclaimeraccepted=yes"
        );
    }
}
