use async_trait::async_trait;
use mira_core::{ParsedVersion, Release};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Roadmap markdown together with the URL a reader can open to see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapDocument {
    pub markdown: String,
    pub source_url: String,
}

/// Where release data and the roadmap come from.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Published (non-draft) releases, newest first.
    async fn releases(&self) -> Result<Vec<Release>, FetchError>;

    /// The newest stable version, or `None` when it cannot be determined.
    async fn current_stable_version(&self) -> Option<ParsedVersion>;

    /// The roadmap document, or `None` when it is missing or blank.
    async fn roadmap(&self) -> Result<Option<RoadmapDocument>, FetchError>;
}
