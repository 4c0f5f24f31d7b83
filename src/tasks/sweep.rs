//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::fetch::SharedCache;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. It acquires a write lock on the cache store to remove
/// expired entries, which also refreshes the persisted entry map.
///
/// # Arguments
/// * `cache` - Shared handle to the cache store
/// * `sweep_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// when the host shuts down.
pub fn spawn_sweep_task(cache: SharedCache, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.sweep_expired()
            };

            if removed > 0 {
                info!("Expiry sweep removed {} entries", removed);
            } else {
                debug!("Expiry sweep found no expired entries");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, PolicyTable};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn shared_store() -> SharedCache {
        Arc::new(RwLock::new(CacheStore::in_memory(PolicyTable::default())))
    }

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let cache = shared_store();

        {
            let mut cache_guard = cache.write().await;
            cache_guard.set("expire-soon", &json!("value"), Some(200));
        }

        let handle = spawn_sweep_task(Arc::clone(&cache), 1);

        // Wait for the entry to expire and a sweep to run
        tokio::time::sleep(Duration::from_millis(1500)).await;

        {
            let cache_guard = cache.read().await;
            assert!(cache_guard.is_empty(), "Expired entry should have been swept");
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_entries() {
        let cache = shared_store();

        {
            let mut cache_guard = cache.write().await;
            cache_guard.set("long-lived", &json!("value"), Some(60_000));
        }

        let handle = spawn_sweep_task(Arc::clone(&cache), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        {
            let mut cache_guard = cache.write().await;
            assert_eq!(
                cache_guard.get::<Value>("long-lived"),
                Some(json!("value")),
                "Valid entry should not be removed"
            );
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let cache = shared_store();

        let handle = spawn_sweep_task(cache, 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
