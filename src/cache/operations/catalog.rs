use std::sync::Arc;

use crate::cache::keys::{CacheKey, CatalogMutation};
use crate::cache::models::{CachedView, decode, encode};
use crate::cache::store::CacheStore;

/// Typed access to the catalog views held in a [`CacheStore`].
///
/// Reads never fail: a backend error or a corrupt entry is logged and
/// reported as a miss, so callers fall back to the backing store.
#[derive(Clone)]
pub struct CatalogCache {
    store: Arc<dyn CacheStore>,
}

impl CatalogCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Cached snapshot of `V`, or `None` on a miss.
    pub async fn load<V: CachedView>(&self) -> Option<V::Snapshot> {
        let raw = match self.store.get(V::KEY.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %V::KEY, "catalog cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %V::KEY, error = %e, "catalog cache read failed");
                return None;
            }
        };

        match decode::<V>(&raw) {
            Ok(snapshot) => {
                tracing::debug!(key = %V::KEY, "catalog cache hit");
                Some(snapshot)
            }
            Err(e) => {
                // Corrupt entries are dropped and rebuilt on this request.
                tracing::warn!(key = %V::KEY, error = %e, "discarding corrupt catalog cache entry");
                self.evict(&[V::KEY]).await;
                None
            }
        }
    }

    /// Stores `snapshot` under `V::KEY`, overwriting any previous value.
    pub async fn put<V: CachedView>(&self, snapshot: &V::Snapshot) {
        let raw = match encode::<V>(snapshot) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %V::KEY, error = %e, "failed to encode catalog snapshot");
                return;
            }
        };
        match self.store.set(V::KEY.as_str(), raw).await {
            Ok(()) => tracing::debug!(key = %V::KEY, "catalog cache populated"),
            Err(e) => tracing::warn!(key = %V::KEY, error = %e, "catalog cache write failed"),
        }
    }

    /// Clears every key `mutation` can affect. Called once per committed write.
    pub async fn invalidate(&self, mutation: CatalogMutation) {
        tracing::debug!(?mutation, "invalidating catalog cache");
        self.evict(mutation.invalidates()).await;
    }

    async fn evict(&self, keys: &[CacheKey]) {
        let names: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        if let Err(e) = self.store.delete(&names).await {
            tracing::error!(keys = ?names, error = %e, "catalog cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::models::CategoriesView;
    use crate::cache::store::MemoryCache;

    fn cache() -> (Arc<MemoryCache>, CatalogCache) {
        let store = Arc::new(MemoryCache::new());
        (store.clone(), CatalogCache::new(store))
    }

    #[tokio::test]
    async fn put_then_load_returns_snapshot() {
        let (_, cache) = cache();
        cache
            .put::<CategoriesView>(&vec!["shoes".to_string()])
            .await;
        assert_eq!(
            cache.load::<CategoriesView>().await,
            Some(vec!["shoes".to_string()])
        );
    }

    #[tokio::test]
    async fn corrupt_entry_is_a_miss_and_gets_deleted() {
        let (store, cache) = cache();
        store
            .set("categories", "{not json".to_string())
            .await
            .unwrap();

        assert_eq!(cache.load::<CategoriesView>().await, None);
        assert!(!store.has("categories").await.unwrap());
    }

    #[tokio::test]
    async fn invalidate_clears_only_mapped_keys() {
        let (store, cache) = cache();
        for key in CacheKey::ALL {
            store.set(key.as_str(), "[]".to_string()).await.unwrap();
        }

        cache.invalidate(CatalogMutation::ReviewChanged).await;

        assert!(!store.has("all-products").await.unwrap());
        assert!(!store.has("admin-products").await.unwrap());
        assert!(store.has("categories").await.unwrap());
    }
}
