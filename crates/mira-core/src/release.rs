use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::version::{ParsedVersion, parse_version};

/// One uploaded file attached to a release.
///
/// Field names follow the GitHub releases API so a release payload can be
/// deserialized directly. Only `name` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(rename = "browser_download_url", default)]
    pub download_url: String,
    #[serde(rename = "size", default)]
    pub size_bytes: u64,
}

impl ReleaseAsset {
    #[must_use]
    pub fn new(name: impl Into<String>, download_url: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
            size_bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Human-facing name: the release title, then the tag, then "Latest".
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| Some(self.tag_name.as_str()).filter(|tag| !tag.is_empty()))
            .unwrap_or("Latest")
    }

    #[must_use]
    pub fn version(&self) -> Option<ParsedVersion> {
        parse_version(&self.tag_name)
    }

    #[must_use]
    pub fn is_stable(&self) -> bool {
        !self.prerelease && !self.draft
    }
}

/// Which release the downloads view should show and whether pre-releases are
/// in play.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseSelection<'a> {
    pub release: Option<&'a Release>,
    pub has_stable: bool,
    pub include_prereleases: bool,
}

/// Interpret the `includePrereleases` query values; any `1` or `true` enables it.
#[must_use]
pub fn parse_include_prereleases<S: AsRef<str>>(values: &[S]) -> bool {
    values
        .iter()
        .any(|value| matches!(value.as_ref(), "1" | "true"))
}

/// Pick the release to present from an API-ordered (newest first) list.
///
/// Drafts are never selected. When no stable release exists, pre-releases are
/// included regardless of the requested flag.
#[must_use]
pub fn select_release(releases: &[Release], include_prereleases: bool) -> ReleaseSelection<'_> {
    let mut published = releases.iter().filter(|release| !release.draft);
    let first_stable = releases.iter().find(|release| release.is_stable());
    let has_stable = first_stable.is_some();
    let include_prereleases = include_prereleases || !has_stable;

    let release = if include_prereleases {
        published.next()
    } else {
        first_stable
    };

    ReleaseSelection {
        release,
        has_stable,
        include_prereleases,
    }
}

/// Version of the newest stable release whose tag parses.
#[must_use]
pub fn latest_stable_version(releases: &[Release]) -> Option<ParsedVersion> {
    releases
        .iter()
        .find(|release| release.is_stable())
        .and_then(Release::version)
}

/// Extract the tag from a release page URL such as
/// `https://github.com/owner/repo/releases/tag/v1.2.3?foo`.
#[must_use]
pub fn tag_from_release_url(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("/tag/")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let tag = &rest[..end];
    (!tag.is_empty()).then_some(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str, prerelease: bool, draft: bool) -> Release {
        Release {
            id: 0,
            name: None,
            tag_name: tag.to_string(),
            html_url: format!("https://github.com/FatalMistake02/mira/releases/tag/{tag}"),
            published_at: None,
            prerelease,
            draft,
            assets: Vec::new(),
        }
    }

    #[test]
    fn asset_deserializes_from_github_fields() {
        let asset: ReleaseAsset = serde_json::from_value(serde_json::json!({
            "name": "Mira-Setup-x64.exe",
            "browser_download_url": "https://example.com/Mira-Setup-x64.exe",
            "size": 1024,
            "content_type": "application/octet-stream"
        }))
        .expect("asset fixture should deserialize");

        assert_eq!(asset.name, "Mira-Setup-x64.exe");
        assert_eq!(asset.download_url, "https://example.com/Mira-Setup-x64.exe");
        assert_eq!(asset.size_bytes, 1024);
    }

    #[test]
    fn asset_only_requires_name() {
        let asset: ReleaseAsset = serde_json::from_value(serde_json::json!({ "name": "Mira.dmg" }))
            .expect("asset with only a name should deserialize");
        assert_eq!(asset, ReleaseAsset::new("Mira.dmg", "", 0));
    }

    #[test]
    fn release_deserializes_publish_date() {
        let release: Release = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Mira 1.0",
            "tag_name": "v1.0.0",
            "html_url": "https://github.com/FatalMistake02/mira/releases/tag/v1.0.0",
            "published_at": "2025-03-14T09:30:00Z",
            "prerelease": false,
            "draft": false,
            "assets": []
        }))
        .expect("release fixture should deserialize");

        assert_eq!(release.display_name(), "Mira 1.0");
        assert_eq!(release.version(), Some(ParsedVersion::new(1, 0, 0)));
        assert!(release.published_at.is_some());
    }

    #[test]
    fn display_name_falls_back_to_tag_then_latest() {
        let mut release = release("v0.3.0", false, false);
        release.name = Some(String::new());
        assert_eq!(release.display_name(), "v0.3.0");

        release.tag_name = String::new();
        assert_eq!(release.display_name(), "Latest");
    }

    #[test]
    fn include_prereleases_accepts_one_or_true() {
        assert!(parse_include_prereleases(&["1"]));
        assert!(parse_include_prereleases(&["0", "true"]));
        assert!(!parse_include_prereleases(&["yes"]));
        assert!(!parse_include_prereleases::<&str>(&[]));
    }

    #[test]
    fn select_release_prefers_first_stable() {
        let releases = vec![
            release("v0.5.0-beta.1", true, false),
            release("v0.4.2", false, false),
            release("v0.4.1", false, false),
        ];

        let selection = select_release(&releases, false);
        assert!(selection.has_stable);
        assert!(!selection.include_prereleases);
        assert_eq!(
            selection.release.map(|r| r.tag_name.as_str()),
            Some("v0.4.2")
        );
    }

    #[test]
    fn select_release_with_prereleases_takes_newest() {
        let releases = vec![
            release("v0.5.0-beta.1", true, false),
            release("v0.4.2", false, false),
        ];

        let selection = select_release(&releases, true);
        assert_eq!(
            selection.release.map(|r| r.tag_name.as_str()),
            Some("v0.5.0-beta.1")
        );
    }

    #[test]
    fn select_release_forces_prereleases_without_stable() {
        let releases = vec![
            release("v0.6.0", false, true),
            release("v0.5.0-beta.2", true, false),
        ];

        let selection = select_release(&releases, false);
        assert!(!selection.has_stable);
        assert!(selection.include_prereleases);
        assert_eq!(
            selection.release.map(|r| r.tag_name.as_str()),
            Some("v0.5.0-beta.2")
        );
    }

    #[test]
    fn select_release_handles_empty_list() {
        let selection = select_release(&[], false);
        assert!(selection.release.is_none());
        assert!(selection.include_prereleases);
    }

    #[test]
    fn latest_stable_version_skips_drafts_and_prereleases() {
        let releases = vec![
            release("v2.0.0", false, true),
            release("v1.9.0-rc.1", true, false),
            release("v1.8.3", false, false),
        ];
        assert_eq!(
            latest_stable_version(&releases),
            Some(ParsedVersion::new(1, 8, 3))
        );
    }

    #[test]
    fn tag_is_read_from_release_page_url() {
        assert_eq!(
            tag_from_release_url("https://github.com/o/r/releases/tag/v1.2.3"),
            Some("v1.2.3")
        );
        assert_eq!(
            tag_from_release_url("https://github.com/o/r/releases/tag/v1.2.3?x=1#top"),
            Some("v1.2.3")
        );
        assert_eq!(tag_from_release_url("https://github.com/o/r/releases"), None);
        assert_eq!(tag_from_release_url("https://github.com/o/r/releases/tag/"), None);
    }
}
