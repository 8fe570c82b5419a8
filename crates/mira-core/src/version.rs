use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

/// A `major.minor.patch` triple read from a loosely formatted version string.
///
/// Pre-release and build suffixes are never part of the value, so `1.2.3-beta`
/// and `1.2.3` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ParsedVersion {
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComponent {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("Expected X.Y.Z at the start of the version, got: {input}")]
    InvalidFormat { input: String },
    #[error("Invalid {component} version: {value}")]
    InvalidComponent {
        component: VersionComponent,
        value: String,
    },
}

impl FromStr for ParsedVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let cleaned = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);

        let numeric_len = cleaned
            .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
            .unwrap_or(cleaned.len());
        let numeric = &cleaned[..numeric_len];

        let invalid_format = || VersionParseError::InvalidFormat {
            input: trimmed.to_string(),
        };

        let mut parts = numeric.split('.');
        let major_str = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or_else(invalid_format)?;
        let minor_str = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or_else(invalid_format)?;
        let patch_str = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or_else(invalid_format)?;

        Ok(ParsedVersion::new(
            parse_component(VersionComponent::Major, major_str)?,
            parse_component(VersionComponent::Minor, minor_str)?,
            parse_component(VersionComponent::Patch, patch_str)?,
        ))
    }
}

fn parse_component(component: VersionComponent, value: &str) -> Result<u64, VersionParseError> {
    value
        .parse()
        .map_err(|_| VersionParseError::InvalidComponent {
            component,
            value: value.to_string(),
        })
}

/// Parse a raw version string such as `v1.4.0`, `1.4.0-beta.2` or `1.4.0.7`.
///
/// Returns `None` when no `major.minor.patch` run starts the string. Callers
/// must treat that as an unknown version, not as `0.0.0`.
#[must_use]
pub fn parse_version(raw: &str) -> Option<ParsedVersion> {
    raw.parse().ok()
}

#[must_use]
pub fn compare_versions(a: &ParsedVersion, b: &ParsedVersion) -> Ordering {
    a.cmp(b)
}

fn embedded_version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)v?(\d+\.\d+\.\d+)\b").expect("embedded version regex must compile")
    })
}

/// Find the first `X.Y.Z` (optionally `v`-prefixed) token anywhere in `text`,
/// for example in a heading like `Mira v0.4.0 (Spring)`.
#[must_use]
pub fn find_version(text: &str) -> Option<ParsedVersion> {
    let captures = embedded_version_pattern().captures(text)?;
    parse_version(captures.get(1)?.as_str())
}
