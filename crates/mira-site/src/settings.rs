use std::path::Path;
use std::time::Duration;

use mira_github::{ClientOptions, RepoRef};
use mira_platform::AppPaths;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_roadmap_path")]
    pub roadmap_path: String,

    #[serde(default)]
    pub include_prereleases: bool,

    #[serde(default = "default_releases_ttl")]
    pub releases_ttl_secs: u64,

    #[serde(default = "default_roadmap_ttl")]
    pub roadmap_ttl_secs: u64,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_retry_delays")]
    pub retry_delays_secs: Vec<u64>,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_repo_owner() -> String {
    RepoRef::default().owner
}

fn default_repo_name() -> String {
    RepoRef::default().name
}

fn default_branch() -> String {
    RepoRef::default().branch
}

fn default_roadmap_path() -> String {
    RepoRef::default().roadmap_path
}

fn default_releases_ttl() -> u64 {
    300
}

fn default_roadmap_ttl() -> u64 {
    600
}

fn default_http_timeout() -> u64 {
    10
}

fn default_retry_delays() -> Vec<u64> {
    vec![0, 2, 5]
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
            branch: default_branch(),
            roadmap_path: default_roadmap_path(),
            include_prereleases: false,
            releases_ttl_secs: default_releases_ttl(),
            roadmap_ttl_secs: default_roadmap_ttl(),
            http_timeout_secs: default_http_timeout(),
            retry_delays_secs: default_retry_delays(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl AppSettings {
    /// Read settings from `path`; a missing or malformed file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|error| {
                log::warn!("Ignoring invalid settings file {}: {error}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, paths: &AppPaths) -> Result<(), std::io::Error> {
        paths.ensure_dirs()?;

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.settings_file(), content)?;
        Ok(())
    }

    pub fn repo(&self) -> RepoRef {
        RepoRef {
            owner: self.repo_owner.clone(),
            name: self.repo_name.clone(),
            branch: self.branch.clone(),
            roadmap_path: self.roadmap_path.clone(),
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.http_timeout_secs),
            retry_delays: self
                .retry_delays_secs
                .iter()
                .copied()
                .map(Duration::from_secs)
                .collect(),
            ..ClientOptions::default()
        }
    }

    pub fn releases_ttl(&self) -> Duration {
        Duration::from_secs(self.releases_ttl_secs)
    }

    pub fn roadmap_ttl(&self) -> Duration {
        Duration::from_secs(self.roadmap_ttl_secs)
    }
}
