mod cache;
mod cli;
mod commands;
mod error;
mod logging;
mod report;
mod settings;

#[cfg(test)]
mod testing;

use std::process::ExitCode;

use clap::Parser;
use mira_github::GitHubClient;
use mira_platform::AppPaths;

use crate::cache::{CachePolicy, CachedSource};
use crate::cli::Cli;
use crate::error::AppError;
use crate::settings::AppSettings;

async fn run(cli: Cli) -> Result<String, AppError> {
    let paths = match &cli.data_dir {
        Some(dir) => AppPaths::rooted_at(dir),
        None => AppPaths::new()?,
    };
    let settings = AppSettings::load_from(&paths.settings_file());

    logging::init_logging(
        &paths,
        cli.debug || settings.debug_logging,
        settings.max_log_size_bytes,
    );
    if paths.settings_file().exists() {
        log::debug!("Using settings from {}", paths.settings_file().display());
    } else if let Err(error) = settings.save(&paths) {
        log::warn!("Could not write default settings: {error}");
    }

    let client = GitHubClient::new(settings.repo(), &settings.client_options())?;
    let source = CachedSource::new(
        client,
        paths.release_cache_file(),
        CachePolicy {
            releases_ttl: settings.releases_ttl(),
            roadmap_ttl: settings.roadmap_ttl(),
            refresh: cli.refresh,
            offline: cli.offline,
        },
    );

    commands::execute(&cli.command, &source, &settings).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            log::error!("{error}");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
