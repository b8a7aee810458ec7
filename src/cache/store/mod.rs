/// Cache store backends
/// Process-local memory store and the Redis store share one contract

pub mod memory;
pub mod redis;

use async_trait::async_trait;

use super::CacheError;

pub use memory::MemoryCache;
pub use self::redis::RedisCache;

/// Plain string key/value store. No TTL, no eviction: an entry lives until
/// it is deleted or the backend goes away.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn has(&self, key: &str) -> Result<bool, CacheError>;

    /// `None` is the miss signal.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;

    /// Removes every listed key that is present; absent keys are ignored.
    async fn delete(&self, keys: &[&str]) -> Result<(), CacheError>;
}
