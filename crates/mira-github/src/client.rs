use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use mira_core::{
    ParsedVersion, Release, latest_stable_version, parse_version, tag_from_release_url,
};

use crate::contents::{ContentsResponse, decode_contents};
use crate::error::{FetchError, response_snippet};
use crate::source::{ReleaseSource, RoadmapDocument};

const API_BASE: &str = "https://api.github.com";
const WEB_BASE: &str = "https://github.com";
const RAW_BASE: &str = "https://raw.githubusercontent.com";
const GITHUB_JSON: &str = "application/vnd.github+json";
const RECENT_RELEASES_PAGE: u32 = 10;

/// Repository holding the releases and the roadmap file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    pub branch: String,
    pub roadmap_path: String,
}

impl Default for RepoRef {
    fn default() -> Self {
        Self {
            owner: "FatalMistake02".to_string(),
            name: "mira".to_string(),
            branch: "main".to_string(),
            roadmap_path: "ROADMAP.md".to_string(),
        }
    }
}

impl RepoRef {
    fn api_url(&self, path: &str) -> String {
        format!("{API_BASE}/repos/{}/{}/{path}", self.owner, self.name)
    }

    #[must_use]
    pub fn releases_url(&self) -> String {
        self.api_url("releases")
    }

    #[must_use]
    pub fn latest_release_url(&self) -> String {
        self.api_url("releases/latest")
    }

    #[must_use]
    pub fn contents_url(&self) -> String {
        self.api_url(&format!("contents/{}?ref={}", self.roadmap_path, self.branch))
    }

    #[must_use]
    pub fn latest_release_page_url(&self) -> String {
        format!("{WEB_BASE}/{}/{}/releases/latest", self.owner, self.name)
    }

    /// Human-readable location of the roadmap file on the branch.
    #[must_use]
    pub fn roadmap_blob_url(&self) -> String {
        format!(
            "{WEB_BASE}/{}/{}/blob/{}/{}",
            self.owner, self.name, self.branch, self.roadmap_path
        )
    }

    #[must_use]
    pub fn roadmap_raw_url(&self) -> String {
        format!(
            "{RAW_BASE}/{}/{}/{}/{}",
            self.owner, self.name, self.branch, self.roadmap_path
        )
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub retry_delays: Vec<Duration>,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retry_delays: [0, 2, 5].into_iter().map(Duration::from_secs).collect(),
            user_agent: format!("mira-site/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

pub struct GitHubClient {
    client: reqwest::Client,
    repo: RepoRef,
    retry_delays: Vec<Duration>,
}

impl GitHubClient {
    /// Build a client for `repo`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(repo: RepoRef, options: &ClientOptions) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self {
            client,
            repo,
            retry_delays: options.retry_delays.clone(),
        })
    }

    #[must_use]
    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    async fn get(&self, url: &str, accept: &str) -> Result<reqwest::Response, FetchError> {
        let mut last_error = None;

        for delay in &self.retry_delays {
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }

            match self.get_once(url, accept).await {
                Ok(response) => return Ok(response),
                Err(error) if error.is_retryable() => {
                    debug!("Attempt for {url} failed, retrying: {error}");
                    last_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }

        match last_error {
            Some(error) => Err(error),
            None => self.get_once(url, accept).await,
        }
    }

    async fn get_once(&self, url: &str, accept: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_snippet = response
                .text()
                .await
                .ok()
                .map(|body| response_snippet(&body, 160))
                .unwrap_or_default();
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status,
                body_snippet,
            });
        }

        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        self.get(url, GITHUB_JSON)
            .await?
            .json()
            .await
            .map_err(|source| FetchError::Parse {
                url: url.to_string(),
                source,
            })
    }

    /// Published releases, newest first. Drafts are dropped.
    ///
    /// # Errors
    /// Returns an error when the request fails or the response cannot be parsed.
    pub async fn fetch_releases(&self) -> Result<Vec<Release>, FetchError> {
        let mut releases: Vec<Release> = self.get_json(&self.repo.releases_url()).await?;
        releases.retain(|release| !release.draft);
        info!("Fetched {} published releases", releases.len());
        Ok(releases)
    }

    /// The release GitHub marks as latest.
    ///
    /// # Errors
    /// Returns an error when the request fails or the response cannot be parsed.
    pub async fn fetch_latest_release(&self) -> Result<Release, FetchError> {
        self.get_json(&self.repo.latest_release_url()).await
    }

    async fn fetch_recent_releases(&self) -> Result<Vec<Release>, FetchError> {
        let url = format!(
            "{}?per_page={RECENT_RELEASES_PAGE}",
            self.repo.releases_url()
        );
        self.get_json(&url).await
    }

    /// Follow the web redirect for `releases/latest` and read the tag from the
    /// final URL.
    async fn resolve_latest_tag_from_page(&self) -> Result<Option<String>, FetchError> {
        let response = self
            .get(&self.repo.latest_release_page_url(), "text/html")
            .await?;
        Ok(tag_from_release_url(response.url().as_str()).map(str::to_string))
    }

    /// Determine the newest stable version, trying the latest-release API, the
    /// recent release list, and finally the web redirect.
    pub async fn fetch_current_stable_version(&self) -> Option<ParsedVersion> {
        match self.fetch_latest_release().await {
            Ok(release) => {
                if let Some(version) = release.version() {
                    return Some(version);
                }
                debug!("Latest release tag {:?} is not a version", release.tag_name);
            }
            Err(error) => warn!("Latest release lookup failed: {error}"),
        }

        match self.fetch_recent_releases().await {
            Ok(releases) => {
                if let Some(version) = latest_stable_version(&releases) {
                    return Some(version);
                }
                debug!("No stable release with a version tag among recent releases");
            }
            Err(error) => warn!("Recent release lookup failed: {error}"),
        }

        match self.resolve_latest_tag_from_page().await {
            Ok(Some(tag)) => {
                let version = parse_version(&tag);
                if version.is_none() {
                    debug!("Latest release page tag {tag:?} is not a version");
                }
                version
            }
            Ok(None) => {
                debug!("Latest release page did not redirect to a tag");
                None
            }
            Err(error) => {
                warn!("Latest release page lookup failed: {error}");
                None
            }
        }
    }

    async fn fetch_roadmap_from_contents_api(&self) -> Result<Option<String>, FetchError> {
        let response: ContentsResponse = self.get_json(&self.repo.contents_url()).await?;
        decode_contents(&response)
    }

    /// Load the roadmap, preferring the contents API and falling back to the
    /// raw file host.
    ///
    /// # Errors
    /// Returns an error when the raw fallback request fails.
    pub async fn fetch_roadmap(&self) -> Result<Option<RoadmapDocument>, FetchError> {
        match self.fetch_roadmap_from_contents_api().await {
            Ok(Some(markdown)) => {
                return Ok(Some(RoadmapDocument {
                    markdown,
                    source_url: self.repo.roadmap_blob_url(),
                }));
            }
            Ok(None) => debug!("Contents API returned no usable roadmap, trying raw file"),
            Err(error) => warn!("Contents API roadmap lookup failed: {error}"),
        }

        let url = self.repo.roadmap_raw_url();
        let markdown = self
            .get(&url, "text/plain")
            .await?
            .text()
            .await
            .map_err(|source| FetchError::Parse {
                url: url.clone(),
                source,
            })?;

        if markdown.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(RoadmapDocument {
            markdown,
            source_url: url,
        }))
    }
}

#[async_trait]
impl ReleaseSource for GitHubClient {
    async fn releases(&self) -> Result<Vec<Release>, FetchError> {
        self.fetch_releases().await
    }

    async fn current_stable_version(&self) -> Option<ParsedVersion> {
        self.fetch_current_stable_version().await
    }

    async fn roadmap(&self) -> Result<Option<RoadmapDocument>, FetchError> {
        self.fetch_roadmap().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ClientOptions, GitHubClient, RepoRef};

    #[test]
    fn default_repo_points_at_mira() {
        let repo = RepoRef::default();

        assert_eq!(
            repo.releases_url(),
            "https://api.github.com/repos/FatalMistake02/mira/releases"
        );
        assert_eq!(
            repo.latest_release_url(),
            "https://api.github.com/repos/FatalMistake02/mira/releases/latest"
        );
        assert_eq!(
            repo.contents_url(),
            "https://api.github.com/repos/FatalMistake02/mira/contents/ROADMAP.md?ref=main"
        );
    }

    #[test]
    fn roadmap_urls_use_branch_and_path() {
        let repo = RepoRef {
            owner: "acme".to_string(),
            name: "browser".to_string(),
            branch: "develop".to_string(),
            roadmap_path: "docs/ROADMAP.md".to_string(),
        };

        assert_eq!(
            repo.roadmap_blob_url(),
            "https://github.com/acme/browser/blob/develop/docs/ROADMAP.md"
        );
        assert_eq!(
            repo.roadmap_raw_url(),
            "https://raw.githubusercontent.com/acme/browser/develop/docs/ROADMAP.md"
        );
        assert_eq!(
            repo.latest_release_page_url(),
            "https://github.com/acme/browser/releases/latest"
        );
    }

    #[test]
    fn default_options_use_three_attempts() {
        let options = ClientOptions::default();

        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(
            options.retry_delays,
            vec![
                Duration::from_secs(0),
                Duration::from_secs(2),
                Duration::from_secs(5)
            ]
        );
        assert!(options.user_agent.starts_with("mira-site/"));
    }

    #[test]
    fn client_builds_with_default_options() {
        let client = GitHubClient::new(RepoRef::default(), &ClientOptions::default())
            .expect("client should build");
        assert_eq!(client.repo().name, "mira");
    }
}
