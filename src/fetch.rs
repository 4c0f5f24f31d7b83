//! Cached Fetch Module
//!
//! Adapts an arbitrary asynchronous loader to the cache store so that
//! repeated requests for the same key within the TTL window never re-invoke
//! the loader, and concurrent first-time requests collapse into one
//! in-flight load.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::CacheStore;

/// Shared handle to the process-wide cache store.
pub type SharedCache = Arc<RwLock<CacheStore>>;

// == Cached Fetch ==
/// Consumer-facing loader adapter over a shared [`CacheStore`].
///
/// Cloning is cheap; clones share the same underlying store.
#[derive(Clone)]
pub struct CachedFetch {
    cache: SharedCache,
}

impl CachedFetch {
    // == Constructor ==
    /// Creates an adapter over an existing shared cache handle.
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }

    /// Wraps a store in a fresh shared handle and returns the adapter.
    pub fn from_store(store: CacheStore) -> Self {
        Self::new(Arc::new(RwLock::new(store)))
    }

    /// Returns the underlying shared cache handle.
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    // == Load ==
    /// Resolves the payload for `key`, from cache when possible.
    ///
    /// On a cache hit the loader is not invoked and the loading flag is
    /// untouched. On a miss the key is marked loading, the loader runs with
    /// no lock held, and on success the result is stored (under
    /// `ttl_override_ms` if given) before the flag clears. Loader errors
    /// clear the flag, cache nothing, and propagate unchanged.
    ///
    /// If another load is already in flight for `key`, returns `Ok(None)`
    /// immediately without invoking the loader or awaiting the in-flight
    /// one; callers observe the value on a later call. A loader that never
    /// settles therefore leaves the key marked loading indefinitely and
    /// blocks deduplicated loads for it - no timeout is imposed here.
    pub async fn load<T, F, Fut>(
        &self,
        key: &str,
        fetch_fn: F,
        ttl_override_ms: Option<u64>,
    ) -> anyhow::Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        self.load_inner(key, fetch_fn, ttl_override_ms, false).await
    }

    // == Refetch ==
    /// Like [`load`](Self::load) but skips the cache read, forcing a fresh
    /// fetch. Still yields `Ok(None)` to an in-flight load.
    pub async fn refetch<T, F, Fut>(
        &self,
        key: &str,
        fetch_fn: F,
        ttl_override_ms: Option<u64>,
    ) -> anyhow::Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        self.load_inner(key, fetch_fn, ttl_override_ms, true).await
    }

    // == Invalidate ==
    /// Removes the entry for `key`. Callers holding a local mirror of the
    /// value should drop it alongside.
    pub async fn invalidate(&self, key: &str) {
        self.cache.write().await.remove(key);
    }

    async fn load_inner<T, F, Fut>(
        &self,
        key: &str,
        fetch_fn: F,
        ttl_override_ms: Option<u64>,
        force_refresh: bool,
    ) -> anyhow::Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        // Check-then-mark happens under one write lock, so two concurrent
        // callers cannot both start a load for the same key.
        {
            let mut cache = self.cache.write().await;

            if !force_refresh {
                if let Some(value) = cache.get::<T>(key) {
                    return Ok(Some(value));
                }
            }

            if cache.is_loading(key) {
                debug!("Load already in flight for '{}', yielding", key);
                return Ok(None);
            }

            cache.set_loading(key, true);
        }

        // No lock held while the loader runs
        let result = fetch_fn().await;

        let mut cache = self.cache.write().await;
        cache.set_loading(key, false);

        match result {
            Ok(value) => {
                cache.set(key, &value, ttl_override_ms);
                Ok(Some(value))
            }
            Err(err) => Err(err),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PolicyTable;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn test_fetcher() -> CachedFetch {
        CachedFetch::from_store(CacheStore::in_memory(PolicyTable::default()))
    }

    #[tokio::test]
    async fn test_load_miss_invokes_loader_and_caches() {
        let fetcher = test_fetcher();
        let calls = Arc::new(AtomicUsize::new(0));

        let counted = Arc::clone(&calls);
        let value: Option<Value> = fetcher
            .load(
                "farm-data:list",
                || async move {
                    counted.fetch_add(1, Ordering::SeqCst);
                    Ok(json!(["farm-a", "farm-b"]))
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(value, Some(json!(["farm-a", "farm-b"])));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut cache = fetcher.cache().write().await;
        assert_eq!(
            cache.get::<Value>("farm-data:list"),
            Some(json!(["farm-a", "farm-b"]))
        );
        assert!(!cache.is_loading("farm-data:list"));
    }

    #[tokio::test]
    async fn test_load_hit_skips_loader() {
        let fetcher = test_fetcher();

        fetcher
            .cache()
            .write()
            .await
            .set("locations:unique", &json!(["Kebumen"]), None);

        let value: Option<Value> = fetcher
            .load(
                "locations:unique",
                || async { panic!("loader must not run on a hit") },
                None,
            )
            .await
            .unwrap();

        assert_eq!(value, Some(json!(["Kebumen"])));
    }

    #[tokio::test]
    async fn test_load_error_propagates_and_caches_nothing() {
        let fetcher = test_fetcher();

        let result: anyhow::Result<Option<Value>> = fetcher
            .load(
                "admin-stats:dashboard",
                || async { Err(anyhow::anyhow!("backend unreachable")) },
                None,
            )
            .await;

        assert!(result.is_err());

        let mut cache = fetcher.cache().write().await;
        assert!(!cache.is_loading("admin-stats:dashboard"));
        assert_eq!(cache.get::<Value>("admin-stats:dashboard"), None);
    }

    #[tokio::test]
    async fn test_concurrent_loads_invoke_loader_once() {
        let fetcher = test_fetcher();
        let calls = Arc::new(AtomicUsize::new(0));

        let slow = {
            let fetcher = fetcher.clone();
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                fetcher
                    .load("images-1", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok(json!("slow"))
                    }, None)
                    .await
            })
        };

        // Let the first caller mark the key as loading
        tokio::time::sleep(Duration::from_millis(30)).await;

        let second: Option<Value> = fetcher
            .load("images-1", || async { Ok(json!("duplicate")) }, None)
            .await
            .unwrap();
        assert_eq!(second, None, "second caller yields to the in-flight load");

        let first: Option<Value> = slow.await.unwrap().unwrap();
        assert_eq!(first, Some(json!("slow")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Once settled, callers are served from cache
        let third: Option<Value> = fetcher
            .load("images-1", || async { Ok(json!("fresh")) }, None)
            .await
            .unwrap();
        assert_eq!(third, Some(json!("slow")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refetch_bypasses_cache() {
        let fetcher = test_fetcher();

        fetcher
            .cache()
            .write()
            .await
            .set("bean-submissions:dashboard", &json!("stale"), None);

        let value: Option<Value> = fetcher
            .refetch(
                "bean-submissions:dashboard",
                || async { Ok(json!("fresh")) },
                None,
            )
            .await
            .unwrap();

        assert_eq!(value, Some(json!("fresh")));
        assert_eq!(
            fetcher
                .cache()
                .write()
                .await
                .get::<Value>("bean-submissions:dashboard"),
            Some(json!("fresh"))
        );
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let fetcher = test_fetcher();

        fetcher
            .cache()
            .write()
            .await
            .set("annotations:1:100", &json!("rows"), None);

        fetcher.invalidate("annotations:1:100").await;

        assert_eq!(
            fetcher.cache().write().await.get::<Value>("annotations:1:100"),
            None
        );
    }

    #[tokio::test]
    async fn test_load_respects_ttl_override() {
        let fetcher = test_fetcher();

        let value: Option<Value> = fetcher
            .load("activity-logs:all", || async { Ok(json!("logs")) }, Some(50))
            .await
            .unwrap();
        assert_eq!(value, Some(json!("logs")));

        tokio::time::sleep(Duration::from_millis(80)).await;

        // Entry expired, so the loader runs again
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let reloaded: Option<Value> = fetcher
            .load(
                "activity-logs:all",
                || async move {
                    counted.fetch_add(1, Ordering::SeqCst);
                    Ok(json!("new logs"))
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(reloaded, Some(json!("new logs")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
