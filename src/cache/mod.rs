// Catalog cache
// Keys, typed snapshots, store backends and the read-through/invalidation operations

pub mod keys;
pub mod models;
pub mod operations;
pub mod store;

pub use keys::{CacheKey, CatalogMutation};
pub use models::{AdminProductsView, AllProductsView, CachedView, CategoriesView, ProductListing};
pub use operations::CatalogCache;
pub use store::{CacheStore, MemoryCache, RedisCache};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(#[from] redis::RedisError),
    #[error("cached value under {key} is corrupt: {source}")]
    Corrupt {
        key: CacheKey,
        source: serde_json::Error,
    },
    #[error("failed to encode cache snapshot: {0}")]
    Encode(serde_json::Error),
}
