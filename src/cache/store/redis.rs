use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use super::CacheStore;
use crate::cache::CacheError;

/// Redis-backed store. Entries are written without expiry, matching the
/// memory backend; invalidation is the only way out.
#[derive(Clone)]
pub struct RedisCache {
    redis_client: Arc<RedisClient>,
}

impl RedisCache {
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[&str]) -> Result<(), CacheError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(keys.to_vec()).await?;
        Ok(())
    }
}
