//! GitHub access for the Mira site.
//!
//! Fetches release lists, the current stable version and `ROADMAP.md`, with a
//! bounded number of attempts per request and sequential fallbacks between
//! endpoints. All decision logic lives in `mira-core`; this crate only moves
//! bytes and reports failures.

mod client;
mod contents;
mod error;
mod source;

pub use client::{ClientOptions, GitHubClient, RepoRef};
pub use error::FetchError;
pub use source::{ReleaseSource, RoadmapDocument};
