use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::milestone::sorted_by_version;
use crate::version::{ParsedVersion, find_version};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapItem {
    pub done: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapMilestone {
    pub heading: String,
    pub version: ParsedVersion,
    pub items: Vec<RoadmapItem>,
}

impl RoadmapMilestone {
    #[must_use]
    pub fn has_unfinished(&self) -> bool {
        self.items.iter().any(|item| !item.done)
    }

    pub fn unfinished(&self) -> impl Iterator<Item = &RoadmapItem> {
        self.items.iter().filter(|item| !item.done)
    }
}

/// Parsed roadmap with milestones in ascending version order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapPlan {
    pub milestones: Vec<RoadmapMilestone>,
    pub source: Option<String>,
}

impl RoadmapPlan {
    #[must_use]
    pub fn from_markdown(markdown: &str, source: Option<String>) -> Self {
        Self {
            milestones: sorted_by_version(parse_roadmap(markdown)),
            source,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }
}

struct LinePatterns {
    heading: Regex,
    task: Regex,
}

fn line_patterns() -> &'static LinePatterns {
    static PATTERNS: OnceLock<LinePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| LinePatterns {
        heading: Regex::new(r"^##\s+(.+)$").expect("heading regex must compile"),
        task: Regex::new(r"^[-*]\s+\[([ xX])\]\s+(.+)$").expect("task regex must compile"),
    })
}

/// Extract versioned milestones and their checklist items, in document order.
///
/// Only `## ` headings carrying an `X.Y.Z` token open a milestone; any other
/// level-2 heading closes the current one, and tasks under it are dropped.
#[must_use]
pub fn parse_roadmap(markdown: &str) -> Vec<RoadmapMilestone> {
    let patterns = line_patterns();
    let mut milestones: Vec<RoadmapMilestone> = Vec::new();
    let mut current: Option<usize> = None;

    for line in markdown.lines() {
        if let Some(heading) = patterns.heading.captures(line) {
            let heading = heading[1].trim();
            current = find_version(heading).map(|version| {
                milestones.push(RoadmapMilestone {
                    heading: heading.to_string(),
                    version,
                    items: Vec::new(),
                });
                milestones.len() - 1
            });
            continue;
        }

        if let Some(index) = current
            && let Some(task) = patterns.task.captures(line)
        {
            milestones[index].items.push(RoadmapItem {
                done: task[1].eq_ignore_ascii_case("x"),
                text: task[2].trim().to_string(),
            });
        }
    }

    milestones
}
