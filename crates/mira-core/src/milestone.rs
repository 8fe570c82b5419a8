use serde::Serialize;

use crate::roadmap::{RoadmapMilestone, RoadmapPlan};
use crate::version::ParsedVersion;

const NO_TASKS_LISTED: &str = "No tasks listed for this milestone.";
const NO_NEWER_MILESTONE_HEADING: &str = "No newer roadmap milestone listed yet";
const NO_NEWER_MILESTONE_DETAIL: &str =
    "ROADMAP.md currently has no version higher than the latest stable release.";

/// Milestones in ascending version order. Equal versions keep document order.
#[must_use]
pub fn sorted_by_version(mut milestones: Vec<RoadmapMilestone>) -> Vec<RoadmapMilestone> {
    milestones.sort_by(|a, b| a.version.cmp(&b.version));
    milestones
}

/// The milestone a reader should look at next.
///
/// With a known `current` version this is the lowest milestone strictly newer
/// than it (or nothing). Without one it is the first milestone that still has
/// open work, falling back to the first milestone overall.
#[must_use]
pub fn next_after(
    milestones: &[RoadmapMilestone],
    current: Option<ParsedVersion>,
) -> Option<&RoadmapMilestone> {
    if let Some(current) = current {
        return milestones
            .iter()
            .filter(|milestone| milestone.version > current)
            .min_by(|a, b| a.version.cmp(&b.version));
    }

    let mut ordered: Vec<&RoadmapMilestone> = milestones.iter().collect();
    ordered.sort_by(|a, b| a.version.cmp(&b.version));
    ordered
        .iter()
        .find(|milestone| milestone.has_unfinished())
        .or_else(|| ordered.first())
        .copied()
}

/// Summary of the upcoming release for the roadmap view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingPlan {
    pub heading: String,
    pub items: Vec<String>,
    pub source: Option<String>,
    pub has_next_version: bool,
}

impl UpcomingPlan {
    fn for_milestone(milestone: &RoadmapMilestone, source: Option<&String>) -> Self {
        let unfinished: Vec<String> = milestone
            .unfinished()
            .map(|item| item.text.clone())
            .collect();
        let mut items = if unfinished.is_empty() {
            milestone.items.iter().map(|item| item.text.clone()).collect()
        } else {
            unfinished
        };
        if items.is_empty() {
            items.push(NO_TASKS_LISTED.to_string());
        }

        Self {
            heading: milestone.heading.clone(),
            items,
            source: source.cloned(),
            has_next_version: true,
        }
    }
}

/// Work out what the roadmap says comes after `current`.
///
/// Returns `None` only when the roadmap has no milestones. When `current` is
/// already at or past every milestone, the first milestone with open work is
/// shown instead; if there is none, the plan says so with
/// `has_next_version == false`.
#[must_use]
pub fn upcoming_plan(plan: &RoadmapPlan, current: Option<ParsedVersion>) -> Option<UpcomingPlan> {
    if plan.milestones.is_empty() {
        return None;
    }

    if let Some(milestone) = next_after(&plan.milestones, current) {
        return Some(UpcomingPlan::for_milestone(milestone, plan.source.as_ref()));
    }

    if let Some(milestone) = next_after(&plan.milestones, None)
        && milestone.has_unfinished()
    {
        let items = milestone
            .unfinished()
            .map(|item| item.text.clone())
            .collect();
        return Some(UpcomingPlan {
            heading: milestone.heading.clone(),
            items,
            source: plan.source.clone(),
            has_next_version: true,
        });
    }

    Some(UpcomingPlan {
        heading: NO_NEWER_MILESTONE_HEADING.to_string(),
        items: vec![NO_NEWER_MILESTONE_DETAIL.to_string()],
        source: plan.source.clone(),
        has_next_version: false,
    })
}
