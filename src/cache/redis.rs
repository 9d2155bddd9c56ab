//! Redis 解析缓存后端

use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use crate::cache::{CacheResult, CachedResolution, ResolutionCache};
use crate::errors::{LinkpulseError, Result};

pub struct RedisCache {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisCache {
    pub async fn new(redis_url: &str, key_prefix: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(|e| {
            LinkpulseError::cache_connection(format!("invalid redis url: {}", e))
        })?;

        let cache = Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: key_prefix.to_string(),
        };

        // 启动时探活，尽早暴露配置错误
        match cache.get_connection().await {
            Ok(mut conn) => {
                let pong: std::result::Result<String, redis::RedisError> =
                    redis::cmd("PING").query_async(&mut conn).await;
                match pong {
                    Ok(response) => debug!("Redis connection test successful: {}", response),
                    Err(e) => {
                        return Err(LinkpulseError::cache_connection(format!(
                            "redis ping failed: {}",
                            e
                        )));
                    }
                }
            }
            Err(e) => {
                return Err(LinkpulseError::cache_connection(format!(
                    "redis connect failed: {}",
                    e
                )));
            }
        }

        debug!("RedisCache created with prefix '{}'", key_prefix);
        Ok(cache)
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> std::result::Result<MultiplexedConnection, redis::RedisError> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    fn make_key(&self, alias: &str) -> String {
        format!("{}{}", self.key_prefix, alias)
    }
}

#[async_trait]
impl ResolutionCache for RedisCache {
    async fn get(&self, alias: &str) -> CacheResult {
        let mut conn = match self.get_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                // 读路径的缓存故障降级为 Miss，回源到 AliasStore
                warn!("Redis get connection failed, treating as miss: {}", e);
                self.reset_connection().await;
                return CacheResult::Miss;
            }
        };

        let raw: std::result::Result<Option<String>, redis::RedisError> =
            conn.get(self.make_key(alias)).await;

        match raw {
            Ok(Some(data)) => match serde_json::from_str::<CachedResolution>(&data) {
                Ok(value) => {
                    trace!("Cache hit for alias '{}'", alias);
                    CacheResult::Found(value)
                }
                Err(e) => {
                    warn!("Corrupt cache entry for alias '{}': {}", alias, e);
                    CacheResult::Miss
                }
            },
            Ok(None) => CacheResult::Miss,
            Err(e) => {
                warn!("Redis GET failed for alias '{}', treating as miss: {}", alias, e);
                self.reset_connection().await;
                CacheResult::Miss
            }
        }
    }

    async fn insert(&self, alias: &str, value: &CachedResolution, ttl_secs: u64) {
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to serialize cache entry for '{}': {}", alias, e);
                return;
            }
        };

        let mut conn = match self.get_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Redis insert connection failed, dropping write: {}", e);
                self.reset_connection().await;
                return;
            }
        };

        let result: std::result::Result<(), redis::RedisError> =
            conn.set_ex(self.make_key(alias), data, ttl_secs).await;

        if let Err(e) = result {
            // 写失败不影响重定向正确性
            warn!("Redis SET failed for alias '{}': {}", alias, e);
            self.reset_connection().await;
        }
    }
}
