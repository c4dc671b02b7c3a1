//! Cache-or-fetch record source.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cragmap_core::error::{CragError, Result};
use cragmap_core::{parse_records, Record};
use tracing::{debug, info, warn};

use crate::fetch::PayloadFetcher;
use crate::RecordSource;

/// Serves records from a local copy of the dataset, fetching a new copy
/// when there is none, when it is older than `max_age`, or when a refresh
/// is forced.
///
/// A failed fetch is returned as-is; the source never retries and never
/// falls back to a stale copy.
pub struct CachedSource<F> {
    fetcher: F,
    cache_path: PathBuf,
    max_age: Option<Duration>,
    force_refresh: bool,
}

impl<F: PayloadFetcher> CachedSource<F> {
    /// A cache that never expires on its own.
    pub fn new(fetcher: F, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            cache_path: cache_path.into(),
            max_age: None,
            force_refresh: false,
        }
    }

    /// Copies at least this old are re-fetched. `None` keeps them forever.
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The cached payload, if present and fresh.
    async fn cached_payload(&self) -> Result<Option<String>> {
        if self.force_refresh {
            debug!("Cache bypassed by refresh");
            return Ok(None);
        }

        let meta = match tokio::fs::metadata(&self.cache_path).await {
            Ok(meta) => meta,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!(path = %self.cache_path.display(), error = %e, "Cache not usable");
                }
                return Ok(None);
            }
        };

        if let Some(max_age) = self.max_age {
            // A modification time in the future counts as brand new.
            let age = meta
                .modified()
                .ok()
                .map(|m| m.elapsed().unwrap_or(Duration::ZERO));
            match age {
                Some(age) if age < max_age => {}
                _ => {
                    debug!(path = %self.cache_path.display(), ?age, "Cached dataset is stale");
                    return Ok(None);
                }
            }
        }

        let payload = tokio::fs::read_to_string(&self.cache_path)
            .await
            .map_err(|e| unavailable(&self.cache_path, e))?;
        Ok(Some(payload))
    }

    /// Fetch a new copy. Only a payload that parses is written to the cache.
    async fn fetch_and_store(&self) -> Result<Vec<Record>> {
        let payload = self.fetcher.fetch().await?;
        let records = parse_records(&payload)?;

        if let Err(e) = self.store(&payload).await {
            warn!(
                path = %self.cache_path.display(),
                error = %e,
                "Failed to write dataset cache"
            );
        }
        Ok(records)
    }

    async fn store(&self, payload: &str) -> std::io::Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.cache_path, payload).await
    }
}

impl<F: PayloadFetcher> RecordSource for CachedSource<F> {
    async fn get_records(&self) -> Result<Vec<Record>> {
        let records = match self.cached_payload().await? {
            Some(payload) => {
                info!(path = %self.cache_path.display(), "Using cached dataset");
                parse_records(&payload)?
            }
            None => self.fetch_and_store().await?,
        };
        info!(count = records.len(), "Records loaded");
        Ok(records)
    }
}

fn unavailable(path: &Path, err: std::io::Error) -> CragError {
    CragError::SourceUnavailable(format!("cannot read cache {}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MockFetcher;

    const PAYLOAD: &str = r#"[
        {"title": "Red Rock", "lat": 36.13, "lon": -115.43, "popularity": 4300, "total": 2600},
        {"title": "Mt. Charleston", "lat": 36.27, "lon": -115.69, "popularity": 1800, "total": 700}
    ]"#;

    const CACHED: &str = r#"[
        {"title": "Cached Crag", "lat": 1.0, "lon": 1.0, "popularity": 1, "total": 1}
    ]"#;

    #[tokio::test]
    async fn test_missing_cache_fetches_and_stores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        let source = CachedSource::new(MockFetcher::with_payload(PAYLOAD), &path);

        let records = source.get_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Red Rock");
        assert_eq!(source.fetcher().calls(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), PAYLOAD);

        // Second call is served from the cache.
        let again = source.get_records().await.unwrap();
        assert_eq!(again, records);
        assert_eq!(source.fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn test_existing_cache_without_max_age_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, CACHED).unwrap();

        let source = CachedSource::new(MockFetcher::with_payload(PAYLOAD), &path);
        let records = source.get_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Cached Crag");
        assert_eq!(source.fetcher().calls(), 0);
    }

    #[tokio::test]
    async fn test_fresh_cache_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, CACHED).unwrap();

        let source = CachedSource::new(MockFetcher::with_payload(PAYLOAD), &path)
            .with_max_age(Some(Duration::from_secs(3600)));
        let records = source.get_records().await.unwrap();
        assert_eq!(records[0].title, "Cached Crag");
        assert_eq!(source.fetcher().calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_cache_is_refetched_and_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, CACHED).unwrap();

        let source = CachedSource::new(MockFetcher::with_payload(PAYLOAD), &path)
            .with_max_age(Some(Duration::ZERO));
        let records = source.get_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(source.fetcher().calls(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), PAYLOAD);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, CACHED).unwrap();

        let source = CachedSource::new(MockFetcher::with_payload(PAYLOAD), &path)
            .with_force_refresh(true);
        let records = source.get_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(source.fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_without_stale_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, CACHED).unwrap();

        let source = CachedSource::new(MockFetcher::failing(), &path)
            .with_max_age(Some(Duration::ZERO));
        let err = source.get_records().await.unwrap_err();
        assert!(matches!(err, CragError::SourceUnavailable(_)));
        assert_eq!(source.fetcher().calls(), 1);
        // The stale copy is left untouched.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CACHED);
    }

    #[tokio::test]
    async fn test_fetch_failure_without_cache() {
        let dir = tempfile::tempdir().unwrap();
        let source = CachedSource::new(MockFetcher::failing(), dir.path().join("data.json"));
        assert!(matches!(
            source.get_records().await,
            Err(CragError::SourceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_unwritable_cache_still_returns_records() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the cache directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("data.json");

        let source = CachedSource::new(MockFetcher::with_payload(PAYLOAD), &path);
        assert_eq!(source.cache_path(), path.as_path());
        let records = source.get_records().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_not_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = CachedSource::new(
            MockFetcher::with_payload(r#"[{"title": "x", "lat": 1.0}]"#),
            dir.path().join("data.json"),
        );
        let err = source.get_records().await.unwrap_err();
        assert!(matches!(err, CragError::MalformedRecord { index: 0, .. }));
    }

    #[tokio::test]
    async fn test_unparseable_download_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let first = CachedSource::new(MockFetcher::with_payload("<html>oops</html>"), &path);
        let err = first.get_records().await.unwrap_err();
        assert!(matches!(err, CragError::Serialization(_)));
        assert!(!path.exists());

        let second = CachedSource::new(MockFetcher::with_payload("[]"), &path)
            .with_max_age(Some(Duration::from_secs(24 * 3600)));
        let records = second.get_records().await.unwrap();
        assert!(records.is_empty());
        assert_eq!(second.fetcher().calls(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_malformed_record_download_keeps_previous_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, CACHED).unwrap();

        let source = CachedSource::new(
            MockFetcher::with_payload(r#"[{"title": "x", "lat": 1.0}]"#),
            &path,
        )
        .with_force_refresh(true);
        let err = source.get_records().await.unwrap_err();
        assert!(matches!(err, CragError::MalformedRecord { index: 0, .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CACHED);
    }
}
