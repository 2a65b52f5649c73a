//! Layered configuration: built-in defaults, then an optional TOML file,
//! then `IMSLIP_`-prefixed environment variables.

pub mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ErrorKind, Result};

/// Default config file probed next to the working directory when no explicit
/// path is given.
pub const DEFAULT_CONFIG_FILE: &str = "imslip.toml";

/// Cookie selecting the catalog's interface language. Without it page
/// structure differs and extraction fails.
pub const LANGUAGE_COOKIE: &str = "imslp_wikiLanguageSelectorLanguage";
/// Cookie accepting the catalog's disclaimer gate.
pub const DISCLAIMER_COOKIE: &str = "imslpdisclaimeraccepted";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the output tree.
    pub out_dir: PathBuf,
    /// Page-cache directory; `None` disables catalog-page caching.
    pub cache_dir: Option<PathBuf>,
    /// Per-request timeout in seconds.
    pub timeout_secs: f64,
    pub retry: RetryConfig,
    pub cookies: CookieConfig,
    pub offsets: Offsets,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            cache_dir: None,
            timeout_secs: 2.0,
            retry: RetryConfig::default(),
            cookies: CookieConfig::default(),
            offsets: Offsets::default(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }
}

/// Retry budget applied by the transport to transient failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_factor: f64,
    pub statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 5, backoff_factor: 3.0, statuses: vec![502, 503, 504] }
    }
}

/// The two persistent cookies the catalog requires before any request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub language: String,
    pub disclaimer_accepted: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self { language: "en".to_string(), disclaimer_accepted: "yes".to_string() }
    }
}

impl CookieConfig {
    /// Name/value pairs in the form the transport sends them.
    pub fn pairs(&self) -> Vec<(String, String)> {
        vec![
            (LANGUAGE_COOKIE.to_string(), self.language.clone()),
            (DISCLAIMER_COOKIE.to_string(), self.disclaimer_accepted.clone()),
        ]
    }
}

/// Resumption offsets: how many already-completed entries to skip at each
/// level on the first pass through it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offsets {
    pub composer: usize,
    pub work: usize,
    pub score: usize,
}

/// Loads configuration. With an explicit `path`, the file must exist; the
/// probed default file is optional.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let figment = match path {
        Some(path) => {
            if !path.exists() {
                exn::bail!(ErrorKind::Load(format!("config file not found: {}", path.display())));
            }
            debug!(path = %path.display(), "loading config file");
            figment.merge(Toml::file_exact(path))
        },
        None => figment.merge(Toml::file(DEFAULT_CONFIG_FILE)),
    };
    figment
        .merge(Env::prefixed("IMSLIP_").split("__"))
        .extract()
        .map_err(|e| ErrorKind::Load(e.to_string()).into())
}
