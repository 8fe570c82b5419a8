use log::warn;
use mira_core::HostOs;
use mira_github::ReleaseSource;
use serde::Serialize;

use crate::cli::Command;
use crate::error::AppError;
use crate::report::{DownloadsReport, RoadmapReport, classify_names, render_classified};
use crate::settings::AppSettings;

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Run `command` against `source` and return the text to print.
///
/// Upstream failures are logged and rendered as "nothing available" rather
/// than failing the command.
pub async fn execute(
    command: &Command,
    source: &dyn ReleaseSource,
    settings: &AppSettings,
) -> Result<String, AppError> {
    match command {
        Command::Downloads {
            include_prereleases,
            host,
            json,
        } => {
            let releases = source.releases().await.unwrap_or_else(|error| {
                warn!("Could not load releases: {error}");
                Vec::new()
            });
            let host = host.map_or_else(HostOs::current, HostOs::from);
            let report = DownloadsReport::build(
                &releases,
                *include_prereleases || settings.include_prereleases,
                host,
            );

            if *json {
                to_json(&report)
            } else {
                Ok(report.render())
            }
        }
        Command::Roadmap { current, all, json } => {
            let document = source.roadmap().await.unwrap_or_else(|error| {
                warn!("Could not load roadmap: {error}");
                None
            });
            let current = match current {
                Some(version) => Some(*version),
                None if *all => None,
                None => source.current_stable_version().await,
            };
            let report = RoadmapReport::build(document.as_ref(), current, *all);

            if *json {
                to_json(&report)
            } else {
                Ok(report.render())
            }
        }
        Command::Classify { names, json } => {
            let assets = classify_names(names);
            if *json {
                to_json(&assets)
            } else {
                Ok(render_classified(&assets))
            }
        }
    }
}
