//! 配置加载
//!
//! 从 `linkpulse.toml`（可选）和 `LINKPULSE_*` 环境变量加载配置，
//! 反序列化为 [`AppConfig`]。配置对象在启动时显式构建，
//! 按依赖注入传入各组件，不使用全局单例。

use serde::Deserialize;

use crate::errors::{LinkpulseError, Result};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub geoip: GeoIpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// 短链前缀，例如 "http://localhost:8080"
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// sqlite / mysql / postgres / memory
    #[serde(default = "default_db_backend")]
    pub backend: String,
    #[serde(default = "default_db_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// redis / moka / null
    #[serde(default = "default_cache_backend")]
    pub backend: String,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// 解析缓存 TTL（秒）
    #[serde(default = "default_ttl")]
    pub default_ttl: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GeoIpConfig {
    /// MaxMind GeoLite2-City.mmdb 路径；未配置时所有字段回落为 Unknown
    pub maxminddb_path: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_db_backend() -> String {
    "sqlite".to_string()
}

fn default_db_url() -> String {
    "sqlite://linkpulse.db?mode=rwc".to_string()
}

fn default_cache_backend() -> String {
    "moka".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "linkpulse:alias:".to_string()
}

fn default_ttl() -> u64 {
    3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: default_base_url(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_db_backend(),
            database_url: default_db_url(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            redis_url: default_redis_url(),
            key_prefix: default_key_prefix(),
            default_ttl: default_ttl(),
        }
    }
}

impl AppConfig {
    /// 加载配置：linkpulse.toml（可选） + LINKPULSE_* 环境变量
    ///
    /// 例如 `LINKPULSE_CACHE__BACKEND=redis` 覆盖 `cache.backend`。
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("linkpulse").required(false))
            .add_source(config::Environment::with_prefix("LINKPULSE").separator("__"))
            .build()
            .map_err(|e| LinkpulseError::database_config(format!("config load failed: {}", e)))?;

        settings
            .try_deserialize()
            .map_err(|e| LinkpulseError::database_config(format!("config parse failed: {}", e)))
    }
}
