//! Plain-text and JSON views of the downloads and roadmap data.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use mira_core::{
    AssetTags, DownloadSlot, HostOs, ParsedVersion, Release, RoadmapPlan, UpcomingPlan,
    assign_slots, classify, is_downloadable, select_release, upcoming_plan,
};
use mira_github::RoadmapDocument;
use serde::Serialize;

const NO_RELEASE: &str = "No GitHub release is currently available.";
const NO_STABLE_NOTICE: &str =
    "No stable latest release was found, so pre-releases are enabled automatically.";
const ROADMAP_UNAVAILABLE: &str = "Couldn't load next release plans right now. Check back soon.";
const SLOT_EMPTY: &str = "Not available in this release.";

/// Long-form publish date, e.g. "March 14, 2025".
pub fn format_published_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseSummary {
    pub name: String,
    pub tag: String,
    pub prerelease: bool,
    pub published: Option<String>,
    pub notes_url: String,
}

impl ReleaseSummary {
    fn from_release(release: &Release) -> Self {
        Self {
            name: release.display_name().to_string(),
            tag: release.tag_name.clone(),
            prerelease: release.prerelease,
            published: release.published_at.as_ref().map(format_published_date),
            notes_url: release.html_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadsReport {
    pub release: Option<ReleaseSummary>,
    pub has_stable: bool,
    pub include_prereleases: bool,
    pub host: HostOs,
    pub downloads: Vec<DownloadSlot>,
}

impl DownloadsReport {
    pub fn build(releases: &[Release], include_prereleases: bool, host: HostOs) -> Self {
        let selection = select_release(releases, include_prereleases);
        let downloads = selection
            .release
            .map(|release| {
                assign_slots(&release.assets)
                    .ordered_for_host(host)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            release: selection.release.map(ReleaseSummary::from_release),
            has_stable: selection.has_stable,
            include_prereleases: selection.include_prereleases,
            host,
            downloads,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        if !self.has_stable && self.release.is_some() {
            let _ = writeln!(out, "{NO_STABLE_NOTICE}");
        }

        let Some(release) = &self.release else {
            out.push_str(NO_RELEASE);
            return out;
        };

        let _ = write!(out, "Showing {} ({})", release.name, release.tag);
        if release.prerelease {
            out.push_str(" [pre-release]");
        }
        if let Some(published) = &release.published {
            let _ = write!(out, ", published on {published}");
        }
        out.push('\n');
        if !release.notes_url.is_empty() {
            let _ = writeln!(out, "Release notes: {}", release.notes_url);
        }

        for slot in &self.downloads {
            let marker = if self.host != HostOs::Other && slot.is_applicable(self.host) {
                '>'
            } else {
                ' '
            };
            out.push('\n');
            match &slot.asset {
                Some(asset) => {
                    let _ = writeln!(out, "{marker} {:<28}{}", slot.label, asset.name);
                    let _ = writeln!(out, "  {:<28}{}", "", asset.download_url);
                }
                None => {
                    let _ = writeln!(out, "{marker} {:<28}{SLOT_EMPTY}", slot.label);
                }
            }
        }

        out.truncate(out.trim_end().len());
        out
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoadmapReport {
    Upcoming {
        current: Option<ParsedVersion>,
        plan: UpcomingPlan,
    },
    Milestones(RoadmapPlan),
    Unavailable,
}

impl RoadmapReport {
    /// `show_all` lists every milestone instead of only the next one.
    pub fn build(
        document: Option<&RoadmapDocument>,
        current: Option<ParsedVersion>,
        show_all: bool,
    ) -> Self {
        let Some(document) = document else {
            return Self::Unavailable;
        };
        let plan = RoadmapPlan::from_markdown(&document.markdown, Some(document.source_url.clone()));

        if show_all {
            if plan.is_empty() {
                return Self::Unavailable;
            }
            return Self::Milestones(plan);
        }

        match upcoming_plan(&plan, current) {
            Some(plan) => Self::Upcoming { current, plan },
            None => Self::Unavailable,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Unavailable => out.push_str(ROADMAP_UNAVAILABLE),
            Self::Upcoming { current, plan } => {
                if plan.has_next_version {
                    let _ = writeln!(out, "Coming in {}", plan.heading);
                } else {
                    let _ = writeln!(out, "{}", plan.heading);
                }
                if let Some(current) = current {
                    let _ = writeln!(out, "Latest stable release: v{current}");
                }
                out.push('\n');
                for item in &plan.items {
                    let _ = writeln!(out, "- {item}");
                }
                if let Some(source) = &plan.source {
                    let _ = writeln!(out, "\nSource: {source}");
                }
            }
            Self::Milestones(plan) => {
                for milestone in &plan.milestones {
                    let _ = writeln!(out, "## {}", milestone.heading);
                    for item in &milestone.items {
                        let mark = if item.done { 'x' } else { ' ' };
                        let _ = writeln!(out, "- [{mark}] {}", item.text);
                    }
                    out.push('\n');
                }
                if let Some(source) = &plan.source {
                    let _ = writeln!(out, "Source: {source}");
                }
            }
        }

        out.truncate(out.trim_end().len());
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedAsset {
    pub name: String,
    pub downloadable: bool,
    pub tags: AssetTags,
}

pub fn classify_names(names: &[String]) -> Vec<ClassifiedAsset> {
    names
        .iter()
        .map(|name| ClassifiedAsset {
            name: name.clone(),
            downloadable: is_downloadable(name),
            tags: classify(name),
        })
        .collect()
}

pub fn render_classified(assets: &[ClassifiedAsset]) -> String {
    let width = assets.iter().map(|asset| asset.name.len()).max().unwrap_or(0);
    assets
        .iter()
        .map(|asset| {
            let tags = if asset.tags.is_empty() {
                "none".to_string()
            } else {
                asset.tags.to_string()
            };
            let suffix = if asset.downloadable {
                ""
            } else {
                " (not downloadable)"
            };
            format!("{:<width$}  {tags}{suffix}", asset.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
