//! 重定向解析（cache-aside）
//!
//! 读路径：先查缓存，命中则完全不碰存储；未命中回源 AliasStore，
//! 命中后以 TTL 写回缓存。缓存故障降级为回源，写回失败只记日志。
//!
//! 解析成功后访问记录是 best-effort：记录失败不影响重定向本身，
//! 只有解析失败才会向调用方返回错误。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheResult, CachedResolution, ResolutionCache};
use crate::errors::{LinkpulseError, Result};
use crate::repository::AliasStore;
use crate::services::visit_recorder::{VisitContext, VisitRecorder};

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAlias {
    pub long_url: String,
    pub url_id: i64,
    pub cache_hit: bool,
}

pub struct RedirectService {
    cache: Arc<dyn ResolutionCache>,
    store: Arc<dyn AliasStore>,
    recorder: Arc<VisitRecorder>,
    cache_ttl: u64,
}

impl RedirectService {
    pub fn new(
        cache: Arc<dyn ResolutionCache>,
        store: Arc<dyn AliasStore>,
        recorder: Arc<VisitRecorder>,
        cache_ttl: u64,
    ) -> Self {
        Self {
            cache,
            store,
            recorder,
            cache_ttl,
        }
    }

    /// 解析别名并记录访问
    pub async fn resolve(&self, alias: &str, visit: VisitContext) -> Result<ResolvedAlias> {
        let resolved = self.resolve_only(alias).await?;

        if let Err(e) = self.recorder.record(resolved.url_id, &visit).await {
            // 分析是旁路的，用户必须照常到达目标地址
            warn!("Visit recording failed for alias '{}': {}", alias, e);
        }

        Ok(resolved)
    }

    /// 纯解析，不触发访问记录（分析查询等场景使用）
    pub async fn resolve_only(&self, alias: &str) -> Result<ResolvedAlias> {
        match self.cache.get(alias).await {
            CacheResult::Found(value) => {
                debug!("Cache hit for alias '{}'", alias);
                Ok(ResolvedAlias {
                    long_url: value.long_url,
                    url_id: value.url_id,
                    cache_hit: true,
                })
            }
            CacheResult::Miss => {
                debug!("Cache miss for alias '{}'", alias);

                let link = self
                    .store
                    .find_by_alias(alias)
                    .await?
                    .ok_or_else(|| LinkpulseError::not_found("Short URL not found"))?;

                let value = CachedResolution {
                    long_url: link.long_url.clone(),
                    url_id: link.id,
                };
                self.cache.insert(alias, &value, self.cache_ttl).await;

                Ok(ResolvedAlias {
                    long_url: link.long_url,
                    url_id: link.id,
                    cache_hit: false,
                })
            }
        }
    }
}
