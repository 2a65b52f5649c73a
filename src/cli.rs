//! Command-line surface. Flags override the corresponding config values.

use std::path::PathBuf;

use clap::Parser;
use imslip_config::Config;

/// Sequential IMSLP catalog crawler and score downloader.
#[derive(Debug, Parser)]
#[command(name = "imslip", version, about)]
pub struct Cli {
    /// Path to a TOML config file (default: probe `imslip.toml`).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Root of the output tree.
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Page-cache directory (omit to disable page caching).
    #[arg(long, value_name = "DIR")]
    pub cache: Option<PathBuf>,

    /// Skip this many composers before processing starts.
    #[arg(long, value_name = "N")]
    pub composer_offset: Option<usize>,

    /// Skip this many works of the first processed composer.
    #[arg(long, value_name = "N")]
    pub work_offset: Option<usize>,

    /// Skip this many score candidates of the first processed work.
    #[arg(long, value_name = "N")]
    pub score_offset: Option<usize>,
}

impl Cli {
    /// Layers flag values over an already-loaded configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(out) = &self.out {
            config.out_dir = out.clone();
        }
        if let Some(cache) = &self.cache {
            config.cache_dir = Some(cache.clone());
        }
        if let Some(offset) = self.composer_offset {
            config.offsets.composer = offset;
        }
        if let Some(offset) = self.work_offset {
            config.offsets.work = offset;
        }
        if let Some(offset) = self.score_offset {
            config.offsets.score = offset;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "imslip",
            "--out",
            "scores",
            "--composer-offset",
            "12",
            "--score-offset",
            "3",
        ]);
        let config = cli.apply(Config::default());
        assert_eq!(config.out_dir, PathBuf::from("scores"));
        assert_eq!(config.offsets.composer, 12);
        assert_eq!(config.offsets.work, 0);
        assert_eq!(config.offsets.score, 3);
    }

    #[test]
    fn test_absent_flags_keep_config_values() {
        let cli = Cli::parse_from(["imslip"]);
        let mut base = Config::default();
        base.offsets.work = 9;
        let config = cli.apply(base.clone());
        assert_eq!(config, base);
    }
}
