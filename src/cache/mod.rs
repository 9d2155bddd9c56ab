//! 解析缓存（cache-aside）
//!
//! 重定向读路径先查缓存，未命中再回源到 AliasStore，并以 TTL 写回。
//! 缓存对正确性是旁路的：任何缓存错误都降级为 Miss 或被记录后吞掉，
//! 不会让请求失败。

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::config::CacheConfig;
use crate::errors::{LinkpulseError, Result};

mod moka;
mod null;
mod redis;

pub use moka::MokaCache;
pub use null::NullCache;
pub use redis::RedisCache;

/// 缓存里的值：alias -> {longUrl, urlId}
///
/// 序列化形态与线上的 JSON 负载保持一致（camelCase）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResolution {
    pub long_url: String,
    pub url_id: i64,
}

/// 缓存查询结果
#[derive(Debug, Clone)]
pub enum CacheResult {
    /// 命中
    Found(CachedResolution),
    /// 未命中，包括后端暂不可用的情况（降级为回源）
    Miss,
}

#[async_trait]
pub trait ResolutionCache: Send + Sync {
    async fn get(&self, alias: &str) -> CacheResult;

    /// 写入缓存。失败只记录日志，绝不向调用方传播。
    async fn insert(&self, alias: &str, value: &CachedResolution, ttl_secs: u64);
}

pub struct CacheFactory;

impl CacheFactory {
    pub async fn create(config: &CacheConfig) -> Result<Arc<dyn ResolutionCache>> {
        match config.backend.as_str() {
            "redis" => {
                let cache = RedisCache::new(&config.redis_url, &config.key_prefix).await?;
                Ok(Arc::new(cache) as Arc<dyn ResolutionCache>)
            }
            "moka" => Ok(Arc::new(MokaCache::new(config.default_ttl)) as Arc<dyn ResolutionCache>),
            "null" => Ok(Arc::new(NullCache) as Arc<dyn ResolutionCache>),
            _ => {
                error!("Unknown cache backend: {}", config.backend);
                Err(LinkpulseError::cache_connection(format!(
                    "Unknown cache backend: {}. Supported: redis, moka, null",
                    config.backend
                )))
            }
        }
    }
}
