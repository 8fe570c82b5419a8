//! Filename-only classification of release artifacts.
//!
//! Every predicate lowercases the name first; nothing here looks at sizes or
//! URLs. Several tags may apply to one name (an `.exe` built for Windows is
//! both `Windows` and `Portable` unless its name says "setup").

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DOWNLOADABLE_EXTENSIONS: [&str; 9] = [
    ".exe",
    ".msi",
    ".dmg",
    ".pkg",
    ".zip",
    ".tar.gz",
    ".appimage",
    ".deb",
    ".rpm",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetTag {
    Windows,
    Mac,
    Linux,
    Installer,
    Portable,
    ArchArm64,
    ArchX64,
    ArchUnknown,
}

impl AssetTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Mac => "mac",
            Self::Linux => "linux",
            Self::Installer => "installer",
            Self::Portable => "portable",
            Self::ArchArm64 => "arch-arm64",
            Self::ArchX64 => "arch-x64",
            Self::ArchUnknown => "arch-unknown",
        }
    }
}

impl fmt::Display for AssetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture a macOS build targets, as far as its name reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MacArch {
    Arm64,
    X64,
    Unknown,
}

impl MacArch {
    #[must_use]
    pub fn tag(self) -> AssetTag {
        match self {
            Self::Arm64 => AssetTag::ArchArm64,
            Self::X64 => AssetTag::ArchX64,
            Self::Unknown => AssetTag::ArchUnknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetTags(BTreeSet<AssetTag>);

impl AssetTags {
    #[must_use]
    pub fn contains(&self, tag: AssetTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = AssetTag> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<AssetTag> for AssetTags {
    fn from_iter<I: IntoIterator<Item = AssetTag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for AssetTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(tag.as_str())?;
        }
        Ok(())
    }
}

/// Tag a filename by platform, packaging type and, for macOS builds,
/// architecture.
#[must_use]
pub fn classify(name: &str) -> AssetTags {
    let mut tags = BTreeSet::new();

    if is_windows_asset(name) {
        tags.insert(AssetTag::Windows);
    }
    if is_mac_asset(name) {
        tags.insert(AssetTag::Mac);
        tags.insert(mac_architecture(name).tag());
    }
    if is_linux_asset(name) {
        tags.insert(AssetTag::Linux);
    }
    if is_installer_asset(name) {
        tags.insert(AssetTag::Installer);
    }
    if is_portable_asset(name) {
        tags.insert(AssetTag::Portable);
    }

    AssetTags(tags)
}

#[must_use]
pub fn is_downloadable(name: &str) -> bool {
    let lower = name.to_lowercase();
    DOWNLOADABLE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext))
}

#[must_use]
pub fn is_windows_asset(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("win") || lower.ends_with(".exe") || lower.ends_with(".msi")
}

#[must_use]
pub fn is_mac_asset(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("mac")
        || lower.contains("darwin")
        || lower.ends_with(".dmg")
        || lower.ends_with(".pkg")
}

#[must_use]
pub fn is_linux_asset(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("linux")
        || lower.ends_with(".appimage")
        || lower.ends_with(".deb")
        || lower.ends_with(".rpm")
}

#[must_use]
pub fn is_installer_asset(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("setup")
        || lower.ends_with(".msi")
        || lower.ends_with(".dmg")
        || lower.ends_with(".pkg")
}

#[must_use]
pub fn is_portable_asset(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("portable")
        || lower.ends_with(".zip")
        || lower.ends_with(".tar.gz")
        || (lower.ends_with(".exe") && !lower.contains("setup"))
}

struct ArchPatterns {
    arm64: Regex,
    x64: Regex,
}

fn arch_patterns() -> &'static ArchPatterns {
    static PATTERNS: OnceLock<ArchPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ArchPatterns {
        arm64: Regex::new(r"\b(?:arm64|aarch64)\b").expect("arm64 regex must compile"),
        x64: Regex::new(r"\b(?:x64|x86_64|amd64|intel)\b").expect("x64 regex must compile"),
    })
}

/// Architecture of a macOS artifact. Tokens must stand alone, so `mira_x64`
/// (joined by an underscore) stays `Unknown`.
#[must_use]
pub fn mac_architecture(name: &str) -> MacArch {
    let lower = name.to_lowercase();
    let patterns = arch_patterns();

    if patterns.arm64.is_match(&lower)
        || lower.contains("apple-silicon")
        || lower.contains("apple_silicon")
    {
        return MacArch::Arm64;
    }

    if patterns.x64.is_match(&lower) {
        return MacArch::X64;
    }

    MacArch::Unknown
}
