//! 存储访问层
//!
//! 核心只依赖三个 trait：[`AliasStore`]、[`AnalyticsStore`]、[`UserStore`]。
//! 持久化后端通过 [`RepositoryFactory`] 按配置选择，当前支持
//! sea-orm（sqlite/mysql/postgres）与内存后端。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::error;

use crate::config::DatabaseConfig;
use crate::errors::{LinkpulseError, Result};

pub mod backends;
pub mod models;

pub use models::{NewShortLink, NewVisitRecord, ShortLink, User, VisitRecord};

/// 短链的持久映射
#[async_trait]
pub trait AliasStore: Send + Sync {
    async fn find_by_alias(&self, alias: &str) -> Result<Option<ShortLink>>;
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<ShortLink>>;
    /// 插入新短链。别名撞上唯一约束时返回 `Conflict`。
    async fn create_link(&self, link: NewShortLink) -> Result<ShortLink>;
    async fn find_by_topic(&self, topic: &str, owner_id: i64) -> Result<Vec<ShortLink>>;
    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<ShortLink>>;
}

/// 原始访问行的读写
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn find_visit(
        &self,
        url_id: i64,
        visitor_key: &str,
        date: NaiveDate,
    ) -> Result<Option<VisitRecord>>;

    /// 插入 clicks=1 的新行。撞上 (url_id, visitor_key, date)
    /// 唯一约束时返回 `Conflict`，调用方应改走递增路径。
    async fn insert_visit(&self, visit: NewVisitRecord) -> Result<VisitRecord>;

    /// 对已存在的行递增点击数
    async fn increment_clicks(&self, visit_id: i64) -> Result<()>;

    async fn find_all_by_url_ids(&self, url_ids: &[i64]) -> Result<Vec<VisitRecord>>;
}

/// 身份解析（邮箱回退路径；已认证 id 由上游保证）
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// 同时实现三个 store trait 的后端句柄
pub trait Repository: AliasStore + AnalyticsStore + UserStore {}

impl<T: AliasStore + AnalyticsStore + UserStore> Repository for T {}

pub struct RepositoryFactory;

impl RepositoryFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<dyn Repository>> {
        match config.backend.as_str() {
            "sqlite" | "mysql" | "postgres" | "mariadb" => {
                let repository =
                    backends::sea_orm::SeaOrmRepository::new(&config.database_url, &config.backend)
                        .await?;
                Ok(Arc::new(repository) as Arc<dyn Repository>)
            }
            "memory" => Ok(Arc::new(backends::memory::MemoryRepository::new()) as Arc<dyn Repository>),
            _ => {
                error!("Unknown repository backend: {}", config.backend);
                Err(LinkpulseError::database_config(format!(
                    "Unknown repository backend: {}. Supported: sqlite, mysql, postgres, mariadb, memory",
                    config.backend
                )))
            }
        }
    }
}
