use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mira_core::{ParsedVersion, Release, ReleaseAsset};
use mira_github::{FetchError, ReleaseSource, RoadmapDocument};

/// In-memory [`ReleaseSource`] that counts how often it is asked.
#[derive(Default)]
pub struct FakeSource {
    pub releases: Vec<Release>,
    pub stable: Option<ParsedVersion>,
    pub roadmap: Option<RoadmapDocument>,
    pub fail: bool,
    pub release_calls: AtomicUsize,
    pub stable_calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_releases(releases: Vec<Release>) -> Self {
        Self {
            releases,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn outage() -> FetchError {
        FetchError::Decode("simulated outage".to_string())
    }
}

#[async_trait]
impl ReleaseSource for FakeSource {
    async fn releases(&self) -> Result<Vec<Release>, FetchError> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Self::outage());
        }
        Ok(self.releases.clone())
    }

    async fn current_stable_version(&self) -> Option<ParsedVersion> {
        self.stable_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail { None } else { self.stable }
    }

    async fn roadmap(&self) -> Result<Option<RoadmapDocument>, FetchError> {
        if self.fail {
            return Err(Self::outage());
        }
        Ok(self.roadmap.clone())
    }
}

pub fn release(tag: &str, prerelease: bool, assets: &[&str]) -> Release {
    Release {
        id: 1,
        name: Some(format!("Mira {tag}")),
        tag_name: tag.to_string(),
        html_url: format!("https://github.com/FatalMistake02/mira/releases/tag/{tag}"),
        published_at: Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).single(),
        prerelease,
        draft: false,
        assets: assets
            .iter()
            .map(|name| {
                ReleaseAsset::new(
                    *name,
                    format!("https://github.com/FatalMistake02/mira/releases/download/{tag}/{name}"),
                    1_000,
                )
            })
            .collect(),
    }
}

pub fn roadmap_document(markdown: &str) -> RoadmapDocument {
    RoadmapDocument {
        markdown: markdown.to_string(),
        source_url: "https://github.com/FatalMistake02/mira/blob/main/ROADMAP.md".to_string(),
    }
}
