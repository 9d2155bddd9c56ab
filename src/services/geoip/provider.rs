//! GeoIP Provider 抽象层

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::maxmind::MaxMindProvider;
use crate::config::GeoIpConfig;
use crate::utils::ip::is_private_or_local;

/// 地理位置信息
#[derive(Debug, Clone, Default)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 国家代码 (e.g., "CN", "US")
    pub country: Option<String>,
    /// 一级行政区代码
    pub region: Option<String>,
    /// 城市名称
    pub city: Option<String>,
}

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    /// 查询 IP 地址的地理位置
    async fn lookup(&self, ip: &str) -> Option<GeoInfo>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 禁用实现：未配置数据库时使用
struct DisabledProvider;

#[async_trait]
impl GeoIpLookup for DisabledProvider {
    async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
        None
    }

    fn name(&self) -> &'static str {
        "Disabled"
    }
}

/// 统一 GeoIP Provider
///
/// 启动时根据配置选择实现：maxminddb_path 配置且可读 → MaxMind，
/// 否则禁用（所有查询返回 None）。
pub struct GeoIpProvider {
    inner: Arc<dyn GeoIpLookup>,
}

impl GeoIpProvider {
    pub fn new(config: &GeoIpConfig) -> Self {
        let inner: Arc<dyn GeoIpLookup> = if let Some(ref path) = config.maxminddb_path {
            match MaxMindProvider::new(path) {
                Ok(provider) => {
                    info!("GeoIP: Using MaxMind database at {}", path);
                    Arc::new(provider)
                }
                Err(e) => {
                    warn!(
                        "GeoIP: Failed to load MaxMind database at {}: {}, geo lookups disabled",
                        path, e
                    );
                    Arc::new(DisabledProvider)
                }
            }
        } else {
            debug!("GeoIP: maxminddb_path not configured, geo lookups disabled");
            Arc::new(DisabledProvider)
        };

        Self { inner }
    }

    /// 测试辅助：直接注入实现
    pub fn with_lookup(inner: Arc<dyn GeoIpLookup>) -> Self {
        Self { inner }
    }

    pub async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        // 私网/环回地址在任何库里都没有条目
        if let Ok(addr) = ip.parse::<std::net::IpAddr>() {
            if is_private_or_local(&addr) {
                return None;
            }
        }

        self.inner.lookup(ip).await
    }

    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}
