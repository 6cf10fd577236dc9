//! Short-lived cache for list reads.
//!
//! Each list is stored under one fixed key. Every settings write invalidates
//! the group list before the response is sent. A group list loaded before an
//! invalidation is never left in the cache after it.

use domain::models::{Badge, BadgeGroup};
use moka::future::Cache;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::middleware::metrics::record_cache_lookup;

/// Cache key for `GET /settings`.
pub const GROUPS_CACHE_KEY: &str = "badge_groups_all";
/// Cache key for `GET /badges`.
pub const BADGES_CACHE_KEY: &str = "active_badges";

#[derive(Debug, Clone)]
enum CachedList {
    Groups(Arc<Vec<BadgeGroup>>),
    Badges(Arc<Vec<Badge>>),
}

#[derive(Debug, Clone)]
pub struct ListCache {
    inner: Cache<&'static str, CachedList>,
    /// Bumped by every group invalidation.
    groups_generation: Arc<AtomicU64>,
}

impl ListCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
            groups_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Cached group list, or the result of `load` which is then cached.
    /// Load errors are returned and nothing is cached.
    pub async fn groups<E, F, Fut>(&self, load: F) -> Result<Arc<Vec<BadgeGroup>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<BadgeGroup>, E>>,
    {
        if let Some(CachedList::Groups(groups)) = self.inner.get(GROUPS_CACHE_KEY).await {
            record_cache_lookup(GROUPS_CACHE_KEY, true);
            return Ok(groups);
        }
        record_cache_lookup(GROUPS_CACHE_KEY, false);

        let generation = self.groups_generation.load(Ordering::SeqCst);
        let groups = Arc::new(load().await?);

        // A write invalidated while we were loading: the rows may predate it.
        if self.groups_generation.load(Ordering::SeqCst) != generation {
            return Ok(groups);
        }
        self.inner
            .insert(GROUPS_CACHE_KEY, CachedList::Groups(groups.clone()))
            .await;
        // An invalidation between the check and the insert may have run
        // before the insert landed.
        if self.groups_generation.load(Ordering::SeqCst) != generation {
            self.inner.invalidate(GROUPS_CACHE_KEY).await;
        }
        Ok(groups)
    }

    /// Cached active badge list, or the result of `load` which is then cached.
    pub async fn badges<E, F, Fut>(&self, load: F) -> Result<Arc<Vec<Badge>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Badge>, E>>,
    {
        if let Some(CachedList::Badges(badges)) = self.inner.get(BADGES_CACHE_KEY).await {
            record_cache_lookup(BADGES_CACHE_KEY, true);
            return Ok(badges);
        }
        record_cache_lookup(BADGES_CACHE_KEY, false);

        let badges = Arc::new(load().await?);
        self.inner
            .insert(BADGES_CACHE_KEY, CachedList::Badges(badges.clone()))
            .await;
        Ok(badges)
    }

    pub async fn invalidate_groups(&self) {
        self.groups_generation.fetch_add(1, Ordering::SeqCst);
        self.inner.invalidate(GROUPS_CACHE_KEY).await;
    }

    pub async fn contains(&self, key: &'static str) -> bool {
        self.inner.get(key).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use std::convert::Infallible;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::oneshot;

    fn group(id: &str) -> BadgeGroup {
        BadgeGroup {
            id: id.to_string(),
            name: id.to_string(),
            is_default: false,
            is_active: true,
            required_plugin: None,
            settings: json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cache() -> ListCache {
        ListCache::new(16, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let cache = cache();
        let loads = AtomicUsize::new(0);

        for _ in 0..2 {
            let groups = cache
                .groups(|| async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Infallible>(vec![group("footer")])
                })
                .await
                .unwrap();
            assert_eq!(groups.len(), 1);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let cache = cache();
        cache
            .groups(|| async { Ok::<_, Infallible>(vec![group("old")]) })
            .await
            .unwrap();
        assert!(cache.contains(GROUPS_CACHE_KEY).await);

        cache.invalidate_groups().await;
        assert!(!cache.contains(GROUPS_CACHE_KEY).await);

        let groups = cache
            .groups(|| async { Ok::<_, Infallible>(vec![group("new")]) })
            .await
            .unwrap();
        assert_eq!(groups[0].id, "new");
    }

    #[tokio::test]
    async fn test_load_racing_invalidation_is_not_cached() {
        let cache = cache();
        let (loaded_tx, loaded_rx) = oneshot::channel::<()>();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .groups(move || async move {
                        let _ = loaded_tx.send(());
                        let _ = release_rx.await;
                        Ok::<_, Infallible>(vec![group("old")])
                    })
                    .await
                    .unwrap()
            })
        };

        // The reader has read the old rows; a write lands before it finishes.
        loaded_rx.await.unwrap();
        cache.invalidate_groups().await;
        release_tx.send(()).unwrap();

        let stale = reader.await.unwrap();
        assert_eq!(stale[0].id, "old");
        assert!(!cache.contains(GROUPS_CACHE_KEY).await);

        let groups = cache
            .groups(|| async { Ok::<_, Infallible>(vec![group("new")]) })
            .await
            .unwrap();
        assert_eq!(groups[0].id, "new");
    }

    #[tokio::test]
    async fn test_load_error_is_not_cached() {
        let cache = cache();
        let result = cache.groups(|| async { Err::<Vec<BadgeGroup>, _>("down") }).await;
        assert_eq!(result.unwrap_err(), "down");
        assert!(!cache.contains(GROUPS_CACHE_KEY).await);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = cache();
        cache
            .groups(|| async { Ok::<_, Infallible>(vec![group("footer")]) })
            .await
            .unwrap();
        cache
            .badges(|| async { Ok::<_, Infallible>(Vec::new()) })
            .await
            .unwrap();

        cache.invalidate_groups().await;
        assert!(cache.contains(BADGES_CACHE_KEY).await);
    }
}
