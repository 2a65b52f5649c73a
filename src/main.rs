use std::process::ExitCode;

use clap::Parser;
use exn::ResultExt;
use imslip_catalog::Catalog;
use imslip_fetch::{HttpFetcher, PageCache, RetryPolicy};
use imslip_library::ScoreStore;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use imslip::error::{ErrorKind, Result};
use imslip::{Cli, Coordinator};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run aborted");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = imslip_config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let config = cli.apply(config);

    let cache = match &config.cache_dir {
        Some(dir) => Some(PageCache::new(dir).or_raise(|| ErrorKind::Cache)?),
        None => None,
    };
    let retry = RetryPolicy {
        max_attempts: config.retry.max_attempts,
        backoff_factor: config.retry.backoff_factor,
        statuses: config.retry.statuses.clone(),
    };
    let fetcher = HttpFetcher::new(config.timeout(), &config.cookies.pairs(), retry, cache);

    let coordinator = Coordinator::new(
        Catalog::new(fetcher),
        ScoreStore::new(&config.out_dir),
        config.offsets,
    );
    let summary = coordinator.run()?;
    info!(%summary, "run complete");
    Ok(())
}
