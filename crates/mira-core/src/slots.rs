use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::classify::{
    MacArch, is_downloadable, is_installer_asset, is_linux_asset, is_mac_asset,
    is_portable_asset, is_windows_asset, mac_architecture,
};
use crate::rank::{TermWeights, choose_best};
use crate::release::ReleaseAsset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformTag {
    Windows,
    Mac,
    MacArm64,
    MacX64,
    Linux,
}

impl PlatformTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Mac => "mac",
            Self::MacArm64 => "mac-arm64",
            Self::MacX64 => "mac-x64",
            Self::Linux => "linux",
        }
    }

    #[must_use]
    pub fn host(self) -> HostOs {
        match self {
            Self::Windows => HostOs::Windows,
            Self::Mac | Self::MacArm64 | Self::MacX64 => HostOs::Mac,
            Self::Linux => HostOs::Linux,
        }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system of whoever is looking at the downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    Windows,
    Mac,
    Linux,
    Other,
}

impl HostOs {
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Mac
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// Interpret a platform or user-agent string such as `Win32`,
    /// `MacIntel` or `Linux x86_64`.
    #[must_use]
    pub fn from_platform_hint(hint: &str) -> Self {
        let lower = hint.to_lowercase();
        if lower.contains("win") {
            Self::Windows
        } else if lower.contains("mac") {
            Self::Mac
        } else if lower.contains("linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotName {
    WindowsInstaller,
    WindowsPortable,
    MacArm64Installer,
    MacArm64Portable,
    MacX64Installer,
    MacX64Portable,
    LinuxAppImage,
    LinuxDeb,
    LinuxRpm,
}

impl SlotName {
    pub const ALL: [SlotName; 9] = [
        SlotName::WindowsInstaller,
        SlotName::WindowsPortable,
        SlotName::MacArm64Installer,
        SlotName::MacArm64Portable,
        SlotName::MacX64Installer,
        SlotName::MacX64Portable,
        SlotName::LinuxAppImage,
        SlotName::LinuxDeb,
        SlotName::LinuxRpm,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::WindowsInstaller => "Windows Installer",
            Self::WindowsPortable => "Windows Portable",
            Self::MacArm64Installer => "macOS (Apple Silicon) Installer",
            Self::MacArm64Portable => "macOS (Apple Silicon) Portable",
            Self::MacX64Installer => "macOS (Intel) Installer",
            Self::MacX64Portable => "macOS (Intel) Portable",
            Self::LinuxAppImage => "Linux AppImage",
            Self::LinuxDeb => "Linux .deb",
            Self::LinuxRpm => "Linux .rpm",
        }
    }

    #[must_use]
    pub fn platform(self) -> PlatformTag {
        match self {
            Self::WindowsInstaller | Self::WindowsPortable => PlatformTag::Windows,
            Self::MacArm64Installer | Self::MacArm64Portable => PlatformTag::MacArm64,
            Self::MacX64Installer | Self::MacX64Portable => PlatformTag::MacX64,
            Self::LinuxAppImage | Self::LinuxDeb | Self::LinuxRpm => PlatformTag::Linux,
        }
    }

    /// Ranking terms, highest priority first.
    #[must_use]
    pub fn ranking_terms(self) -> &'static [&'static str] {
        match self {
            Self::WindowsInstaller => &["setup", ".msi", ".exe"],
            Self::WindowsPortable => &["portable", ".exe", ".zip"],
            Self::MacArm64Installer | Self::MacX64Installer => &["dmg", "pkg"],
            Self::MacArm64Portable | Self::MacX64Portable => &["portable", ".zip", ".tar.gz"],
            Self::LinuxAppImage => &[".appimage"],
            Self::LinuxDeb => &[".deb"],
            Self::LinuxRpm => &[".rpm"],
        }
    }

    #[must_use]
    pub fn weights(self) -> TermWeights {
        TermWeights::from_priority(self.ranking_terms())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadSlot {
    pub slot: SlotName,
    pub label: &'static str,
    pub platform: PlatformTag,
    pub asset: Option<ReleaseAsset>,
}

impl DownloadSlot {
    fn new(slot: SlotName, asset: Option<&ReleaseAsset>) -> Self {
        Self {
            slot,
            label: slot.label(),
            platform: slot.platform(),
            asset: asset.cloned(),
        }
    }

    /// Whether this download suits `host`. Every slot suits an unrecognised
    /// host.
    #[must_use]
    pub fn is_applicable(&self, host: HostOs) -> bool {
        host == HostOs::Other || self.platform.host() == host
    }
}

/// The complete set of download slots for one release. Every [`SlotName`] is
/// present, with or without an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DownloadSlots(BTreeMap<SlotName, DownloadSlot>);

impl DownloadSlots {
    #[must_use]
    pub fn get(&self, slot: SlotName) -> Option<&DownloadSlot> {
        self.0.get(&slot)
    }

    #[must_use]
    pub fn asset(&self, slot: SlotName) -> Option<&ReleaseAsset> {
        self.get(slot).and_then(|slot| slot.asset.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DownloadSlot> {
        self.0.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Slots ordered for `host`: matching platforms first, otherwise in
    /// presentation order.
    #[must_use]
    pub fn ordered_for_host(&self, host: HostOs) -> Vec<&DownloadSlot> {
        let mut ordered: Vec<&DownloadSlot> = self.iter().collect();
        if host != HostOs::Other {
            ordered.sort_by_key(|slot| !slot.is_applicable(host));
        }
        ordered
    }
}

#[derive(Clone, Copy)]
enum Packaging {
    Installer,
    Portable,
}

impl Packaging {
    fn matches(self, name: &str) -> bool {
        match self {
            Self::Installer => is_installer_asset(name),
            Self::Portable => is_portable_asset(name),
        }
    }
}

fn select<'a>(pool: &[&'a ReleaseAsset], keep: impl Fn(&str) -> bool) -> Vec<&'a ReleaseAsset> {
    pool.iter()
        .copied()
        .filter(|asset| keep(asset.name.as_str()))
        .collect()
}

/// Mac candidates for one (architecture, packaging) pair, falling back to
/// builds with no architecture marker. Never borrows the other architecture.
fn mac_candidates<'a>(
    mac: &[(&'a ReleaseAsset, MacArch)],
    arch: MacArch,
    packaging: Packaging,
    slot: SlotName,
) -> Vec<&'a ReleaseAsset> {
    let matching = |wanted: MacArch| -> Vec<&'a ReleaseAsset> {
        mac.iter()
            .filter(|(asset, asset_arch)| {
                *asset_arch == wanted && packaging.matches(&asset.name)
            })
            .map(|(asset, _)| *asset)
            .collect()
    };

    let specific = matching(arch);
    if !specific.is_empty() {
        return specific;
    }

    let fallback = matching(MacArch::Unknown);
    if !fallback.is_empty() {
        debug!(
            "No {arch:?} build for {slot:?}, using {} architecture-neutral candidate(s)",
            fallback.len()
        );
    }
    fallback
}

/// Assign the best artifact of a release to each download slot.
#[must_use]
pub fn assign_slots(assets: &[ReleaseAsset]) -> DownloadSlots {
    let eligible: Vec<&ReleaseAsset> = assets
        .iter()
        .filter(|asset| is_downloadable(&asset.name))
        .collect();

    let windows = select(&eligible, is_windows_asset);
    let linux = select(&eligible, is_linux_asset);
    let mac: Vec<(&ReleaseAsset, MacArch)> = eligible
        .iter()
        .copied()
        .filter(|asset| is_mac_asset(&asset.name))
        .map(|asset| (asset, mac_architecture(&asset.name)))
        .collect();

    let candidates_for = |slot: SlotName| {
        match slot {
            SlotName::WindowsInstaller => select(&windows, is_installer_asset),
            SlotName::WindowsPortable => select(&windows, is_portable_asset),
            SlotName::MacArm64Installer => {
                mac_candidates(&mac, MacArch::Arm64, Packaging::Installer, slot)
            }
            SlotName::MacArm64Portable => {
                mac_candidates(&mac, MacArch::Arm64, Packaging::Portable, slot)
            }
            SlotName::MacX64Installer => {
                mac_candidates(&mac, MacArch::X64, Packaging::Installer, slot)
            }
            SlotName::MacX64Portable => {
                mac_candidates(&mac, MacArch::X64, Packaging::Portable, slot)
            }
            SlotName::LinuxAppImage => select(&linux, |name| has_extension(name, ".appimage")),
            SlotName::LinuxDeb => select(&linux, |name| has_extension(name, ".deb")),
            SlotName::LinuxRpm => select(&linux, |name| has_extension(name, ".rpm")),
        }
    };

    let slots = SlotName::ALL
        .into_iter()
        .map(|slot| {
            let candidates = candidates_for(slot);
            let asset = choose_best(&candidates, &slot.weights());
            (slot, DownloadSlot::new(slot, asset))
        })
        .collect();

    DownloadSlots(slots)
}

fn has_extension(name: &str, extension: &str) -> bool {
    name.to_lowercase().ends_with(extension)
}
