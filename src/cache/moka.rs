//! 进程内 Moka 缓存后端
//!
//! 单实例部署时可替代 Redis。TTL 在构建时按配置统一设置，
//! insert 的 ttl 参数不做逐条覆盖。

use async_trait::async_trait;
use moka::future::Cache;

use crate::cache::{CacheResult, CachedResolution, ResolutionCache};

pub struct MokaCache {
    inner: Cache<String, CachedResolution>,
}

impl MokaCache {
    pub fn new(ttl_secs: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(std::time::Duration::from_secs(ttl_secs))
            .build();
        Self { inner }
    }
}

#[async_trait]
impl ResolutionCache for MokaCache {
    async fn get(&self, alias: &str) -> CacheResult {
        match self.inner.get(alias).await {
            Some(value) => CacheResult::Found(value),
            None => CacheResult::Miss,
        }
    }

    async fn insert(&self, alias: &str, value: &CachedResolution, _ttl_secs: u64) {
        self.inner.insert(alias.to_string(), value.clone()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip() {
        let cache = MokaCache::new(60);
        let value = CachedResolution {
            long_url: "https://example.com".to_string(),
            url_id: 42,
        };

        assert!(matches!(cache.get("abc").await, CacheResult::Miss));
        cache.insert("abc", &value, 60).await;

        match cache.get("abc").await {
            CacheResult::Found(found) => assert_eq!(found, value),
            CacheResult::Miss => panic!("expected hit"),
        }
    }
}
