use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, warn};
use mira_core::{ParsedVersion, Release};
use mira_github::{FetchError, ReleaseSource, RoadmapDocument};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cached<T> {
    pub value: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> Cached<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            cached_at: Utc::now(),
        }
    }

    /// Entries stamped in the future (clock changes) count as fresh.
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let Ok(ttl) = TimeDelta::from_std(ttl) else {
            return true;
        };
        now.signed_duration_since(self.cached_at) < ttl
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DiskCache {
    #[serde(default)]
    pub releases: Option<Cached<Vec<Release>>>,
    #[serde(default)]
    pub stable_version: Option<Cached<ParsedVersion>>,
    #[serde(default)]
    pub roadmap: Option<Cached<RoadmapDocument>>,
}

impl DiskCache {
    pub fn load_from_path(path: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(cache) => Some(cache),
            Err(error) => {
                debug!("Discarding unreadable cache {}: {error}", path.display());
                None
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_vec(self) {
            Ok(data) => {
                if let Err(error) = write_atomic(path, &data) {
                    warn!("Failed to write cache {}: {error}", path.display());
                }
            }
            Err(error) => warn!("Failed to serialize cache: {error}"),
        }
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "cache path has no parent")
    })?;

    let file_name = path
        .file_name()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("cache");
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    let pid = std::process::id();

    let mut tmp_path = None;
    for attempt in 0..16_u8 {
        let candidate = parent.join(format!(".{file_name}.{pid}.{timestamp}.{attempt}.tmp"));
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(mut file) => {
                file.write_all(data)?;
                file.sync_all()?;
                tmp_path = Some(candidate);
                break;
            }
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(error) => return Err(error),
        }
    }

    let Some(tmp_path) = tmp_path else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "failed to create unique cache temp file",
        ));
    };

    if let Err(error) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(error);
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub releases_ttl: Duration,
    pub roadmap_ttl: Duration,
    /// Skip fresh cache hits and always ask the upstream source first.
    pub refresh: bool,
    /// Answer from the cache only, whatever its age.
    pub offline: bool,
}

/// A [`ReleaseSource`] that answers from the disk cache while entries are
/// fresh, and falls back to stale entries when the upstream source fails.
pub struct CachedSource<S> {
    inner: S,
    path: PathBuf,
    policy: CachePolicy,
    cache: Mutex<DiskCache>,
}

impl<S: ReleaseSource> CachedSource<S> {
    pub fn new(inner: S, path: PathBuf, policy: CachePolicy) -> Self {
        let cache = DiskCache::load_from_path(&path).unwrap_or_default();
        Self {
            inner,
            path,
            policy,
            cache: Mutex::new(cache),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DiskCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh<T: Clone>(
        &self,
        select: impl Fn(&DiskCache) -> Option<&Cached<T>>,
        ttl: Duration,
    ) -> Option<T> {
        if self.policy.offline {
            return self.stale(select);
        }
        if self.policy.refresh {
            return None;
        }
        let cache = self.lock();
        select(&cache)
            .filter(|entry| entry.is_fresh(ttl, Utc::now()))
            .map(|entry| entry.value.clone())
    }

    fn stale<T: Clone>(&self, select: impl Fn(&DiskCache) -> Option<&Cached<T>>) -> Option<T> {
        let cache = self.lock();
        select(&cache).map(|entry| entry.value.clone())
    }

    fn update(&self, apply: impl FnOnce(&mut DiskCache)) {
        let mut cache = self.lock();
        apply(&mut cache);
        cache.save_to_path(&self.path);
    }
}

#[async_trait]
impl<S: ReleaseSource> ReleaseSource for CachedSource<S> {
    async fn releases(&self) -> Result<Vec<Release>, FetchError> {
        if let Some(releases) = self.fresh(|cache| cache.releases.as_ref(), self.policy.releases_ttl)
        {
            debug!("Using cached releases");
            return Ok(releases);
        }
        if self.policy.offline {
            warn!("Offline and no releases are cached");
            return Ok(Vec::new());
        }

        match self.inner.releases().await {
            Ok(releases) => {
                let stored = releases.clone();
                self.update(|cache| cache.releases = Some(Cached::new(stored)));
                Ok(releases)
            }
            Err(error) => match self.stale(|cache| cache.releases.as_ref()) {
                Some(releases) => {
                    warn!("Release fetch failed, using cached releases: {error}");
                    Ok(releases)
                }
                None => Err(error),
            },
        }
    }

    async fn current_stable_version(&self) -> Option<ParsedVersion> {
        if let Some(version) =
            self.fresh(|cache| cache.stable_version.as_ref(), self.policy.releases_ttl)
        {
            return Some(version);
        }
        if self.policy.offline {
            return None;
        }

        match self.inner.current_stable_version().await {
            Some(version) => {
                self.update(|cache| cache.stable_version = Some(Cached::new(version)));
                Some(version)
            }
            None => self.stale(|cache| cache.stable_version.as_ref()),
        }
    }

    async fn roadmap(&self) -> Result<Option<RoadmapDocument>, FetchError> {
        if let Some(document) = self.fresh(|cache| cache.roadmap.as_ref(), self.policy.roadmap_ttl) {
            debug!("Using cached roadmap");
            return Ok(Some(document));
        }
        if self.policy.offline {
            warn!("Offline and no roadmap is cached");
            return Ok(None);
        }

        match self.inner.roadmap().await {
            Ok(Some(document)) => {
                let stored = document.clone();
                self.update(|cache| cache.roadmap = Some(Cached::new(stored)));
                Ok(Some(document))
            }
            Ok(None) => Ok(None),
            Err(error) => match self.stale(|cache| cache.roadmap.as_ref()) {
                Some(document) => {
                    warn!("Roadmap fetch failed, using cached copy: {error}");
                    Ok(Some(document))
                }
                None => Err(error),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use chrono::{TimeDelta, Utc};
    use mira_core::ParsedVersion;
    use mira_github::ReleaseSource;

    use super::{CachePolicy, Cached, CachedSource, DiskCache};
    use crate::testing::{FakeSource, release, roadmap_document};

    fn policy(refresh: bool) -> CachePolicy {
        CachePolicy {
            releases_ttl: Duration::from_secs(300),
            roadmap_ttl: Duration::from_secs(600),
            refresh,
            offline: false,
        }
    }

    #[test]
    fn freshness_respects_ttl() {
        let now = Utc::now();
        let entry = Cached {
            value: 1,
            cached_at: now - TimeDelta::seconds(120),
        };

        assert!(entry.is_fresh(Duration::from_secs(300), now));
        assert!(!entry.is_fresh(Duration::from_secs(60), now));

        let future = Cached {
            value: 1,
            cached_at: now + TimeDelta::seconds(30),
        };
        assert!(future.is_fresh(Duration::from_secs(1), now));
    }

    #[test]
    fn save_and_load_round_trip_through_disk() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = temp_dir.path().join("cache").join("releases.json");

        let cache = DiskCache {
            releases: Some(Cached::new(vec![release("v1.0.0", false, &["Mira.dmg"])])),
            stable_version: Some(Cached::new(ParsedVersion::new(1, 0, 0))),
            roadmap: None,
        };
        cache.save_to_path(&path);

        let loaded = DiskCache::load_from_path(&path).expect("cache should load");
        let releases = loaded.releases.expect("releases should be cached").value;
        assert_eq!(releases[0].tag_name, "v1.0.0");
        assert_eq!(
            loaded.stable_version.map(|entry| entry.value),
            Some(ParsedVersion::new(1, 0, 0))
        );
        assert!(loaded.roadmap.is_none());

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().expect("cache dir"))
            .expect("cache dir should be readable")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn corrupt_cache_file_is_ignored() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = temp_dir.path().join("releases.json");
        std::fs::write(&path, "[1, 2").expect("cache file should be written");

        assert!(DiskCache::load_from_path(&path).is_none());
    }

    #[tokio::test]
    async fn fresh_entries_skip_the_upstream_source() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = temp_dir.path().join("releases.json");
        let fake = FakeSource::with_releases(vec![release("v1.0.0", false, &[])]);
        let source = CachedSource::new(fake, path.clone(), policy(false));

        source.releases().await.expect("first fetch should succeed");
        source.releases().await.expect("second fetch should succeed");
        assert_eq!(source.inner.release_calls.load(Ordering::SeqCst), 1);

        let reopened = CachedSource::new(FakeSource::failing(), path, policy(false));
        let releases = reopened.releases().await.expect("disk cache should answer");
        assert_eq!(releases.len(), 1);
        assert_eq!(reopened.inner.release_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refresh_bypasses_fresh_entries() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = temp_dir.path().join("releases.json");
        let fake = FakeSource::with_releases(vec![release("v1.0.0", false, &[])]);
        let source = CachedSource::new(fake, path, policy(true));

        source.releases().await.expect("first fetch should succeed");
        source.releases().await.expect("second fetch should succeed");
        assert_eq!(source.inner.release_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stale_entries_cover_upstream_failures() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = temp_dir.path().join("releases.json");
        DiskCache {
            releases: Some(Cached {
                value: vec![release("v0.9.0", false, &[])],
                cached_at: Utc::now() - TimeDelta::days(2),
            }),
            stable_version: None,
            roadmap: Some(Cached {
                value: roadmap_document("## v1.0.0\n- [ ] ship\n"),
                cached_at: Utc::now() - TimeDelta::days(2),
            }),
        }
        .save_to_path(&path);

        let source = CachedSource::new(FakeSource::failing(), path, policy(false));

        let releases = source.releases().await.expect("stale releases should be used");
        assert_eq!(releases[0].tag_name, "v0.9.0");
        assert_eq!(source.inner.release_calls.load(Ordering::SeqCst), 1);

        let roadmap = source
            .roadmap()
            .await
            .expect("stale roadmap should be used")
            .expect("roadmap should be present");
        assert!(roadmap.markdown.contains("v1.0.0"));
    }

    #[tokio::test]
    async fn offline_mode_never_calls_upstream() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let path = temp_dir.path().join("releases.json");
        DiskCache {
            releases: Some(Cached {
                value: vec![release("v0.9.0", false, &[])],
                cached_at: Utc::now() - TimeDelta::days(30),
            }),
            ..DiskCache::default()
        }
        .save_to_path(&path);
        let offline = CachePolicy {
            offline: true,
            ..policy(false)
        };

        let source = CachedSource::new(FakeSource::default(), path, offline);

        let releases = source.releases().await.expect("cached releases should be used");
        assert_eq!(releases[0].tag_name, "v0.9.0");
        assert_eq!(source.roadmap().await.expect("offline roadmap"), None);
        assert_eq!(source.current_stable_version().await, None);
        assert_eq!(source.inner.release_calls.load(Ordering::SeqCst), 0);
        assert_eq!(source.inner.stable_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failures_without_cache_are_reported() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let source = CachedSource::new(
            FakeSource::failing(),
            temp_dir.path().join("releases.json"),
            policy(false),
        );

        assert!(source.releases().await.is_err());
        assert!(source.roadmap().await.is_err());
        assert_eq!(source.current_stable_version().await, None);
    }

    #[tokio::test]
    async fn stable_version_is_cached() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let mut fake = FakeSource::with_releases(Vec::new());
        fake.stable = Some(ParsedVersion::new(1, 2, 0));
        let source = CachedSource::new(fake, temp_dir.path().join("releases.json"), policy(false));

        assert_eq!(
            source.current_stable_version().await,
            Some(ParsedVersion::new(1, 2, 0))
        );
        assert_eq!(
            source.current_stable_version().await,
            Some(ParsedVersion::new(1, 2, 0))
        );
        assert_eq!(source.inner.stable_calls.load(Ordering::SeqCst), 1);
    }
}
