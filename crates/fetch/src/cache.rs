//! On-disk page cache.
//!
//! Stores successful catalog-page responses so interrupted crawls re-read
//! them from disk instead of the network. Each entry is a body file plus a
//! small JSON sidecar carrying the status and final URL. Only status-200
//! responses are cached; error pages must never shadow a later good fetch.

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::Response;
use crate::error::{ErrorKind, Result};

const BODY_SUFFIX: &str = ".body";
const META_SUFFIX: &str = ".meta";

#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    status: u16,
    final_url: String,
}

/// Disk-backed cache of fetched pages, addressed by URL-derived keys.
#[derive(Debug, Clone)]
pub struct PageCache {
    root: PathBuf,
}

impl PageCache {
    /// Opens (and creates, if needed) a cache rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(ErrorKind::Io)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot(&self, key: &Url, suffix: &str) -> PathBuf {
        self.root.join(format!("{}{suffix}", sanitize_key(key)))
    }

    /// Looks up a cached response. Unreadable or malformed entries count as
    /// misses, never as failures; the fetch path will overwrite them.
    pub fn load(&self, key: &Url) -> Option<Response> {
        let body = match fs::read(self.slot(key, BODY_SUFFIX)) {
            Ok(body) => body,
            Err(e) if e.kind() == IoErrorKind::NotFound => return None,
            Err(e) => {
                debug!(key = %key, error = %e, "unreadable cache body, treating as miss");
                return None;
            },
        };
        let sidecar = fs::read(self.slot(key, META_SUFFIX)).ok()?;
        let sidecar: Sidecar = serde_json::from_slice(&sidecar).ok()?;
        let final_url = Url::parse(&sidecar.final_url).ok()?;
        Some(Response { status: sidecar.status, final_url, body })
    }

    /// Persists a response under `key`.
    pub fn store(&self, key: &Url, response: &Response) -> Result<()> {
        let sidecar = Sidecar {
            status: response.status,
            final_url: response.final_url.to_string(),
        };
        let sidecar = serde_json::to_vec(&sidecar).map_err(|e| ErrorKind::Cache(e.to_string()))?;
        fs::write(self.slot(key, BODY_SUFFIX), &response.body).map_err(ErrorKind::Io)?;
        fs::write(self.slot(key, META_SUFFIX), sidecar).map_err(ErrorKind::Io)?;
        Ok(())
    }
}

/// Flattens a URL into a single safe filename component.
fn sanitize_key(url: &Url) -> String {
    url.as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-') { c } else { '_' })
        .collect()
}
