use async_trait::async_trait;
use tracing::trace;

use crate::cache::{CacheResult, CachedResolution, ResolutionCache};

/// 空实现：所有查询都 Miss，所有写入都丢弃。
/// 用于关闭缓存的部署和需要强制回源的测试。
pub struct NullCache;

#[async_trait]
impl ResolutionCache for NullCache {
    async fn get(&self, alias: &str) -> CacheResult {
        trace!("NullCache.get called for alias: {}", alias);
        CacheResult::Miss
    }

    async fn insert(&self, alias: &str, _value: &CachedResolution, _ttl_secs: u64) {
        trace!("NullCache.insert called for alias: {}", alias);
    }
}
