//! Release and roadmap logic for the Mira site.
//!
//! Everything in this crate is a pure transformation over data fetched
//! elsewhere:
//! - Artifact name classification and weighted ranking.
//! - Download slot assignment with macOS architecture fallback.
//! - Loose semantic version parsing and ordering.
//! - `ROADMAP.md` parsing and "what comes next" resolution.
//! - Release selection (drafts, pre-releases).

mod classify;
mod milestone;
mod rank;
mod release;
mod roadmap;
mod slots;
mod version;

/// Filename predicates and the tag set produced by [`classify`].
pub use classify::{
    AssetTag, AssetTags, DOWNLOADABLE_EXTENSIONS, MacArch, classify, is_downloadable,
    is_installer_asset, is_linux_asset, is_mac_asset, is_portable_asset, is_windows_asset,
    mac_architecture,
};
/// Milestone ordering and the upcoming-release summary.
pub use milestone::{UpcomingPlan, next_after, sorted_by_version, upcoming_plan};
/// Term-weighted artifact ranking.
pub use rank::{TermWeights, choose_best};
/// GitHub release model and selection helpers.
pub use release::{
    Release, ReleaseAsset, ReleaseSelection, latest_stable_version, parse_include_prereleases,
    select_release, tag_from_release_url,
};
/// Roadmap markdown model and parser.
pub use roadmap::{RoadmapItem, RoadmapMilestone, RoadmapPlan, parse_roadmap};
/// Download slots and host-relative ordering.
pub use slots::{DownloadSlot, DownloadSlots, HostOs, PlatformTag, SlotName, assign_slots};
/// Version parsing and comparison.
pub use version::{
    ParsedVersion, VersionComponent, VersionParseError, compare_versions, find_version,
    parse_version,
};
