//! Sea-ORM 持久化后端
//!
//! 支持 sqlite / mysql / postgres，连接时自动运行迁移。
//! 实体定义在 `migration` crate 中。

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter,
    sea_query::{Expr, ExprTrait},
};
use tracing::{info, warn};

use crate::errors::{LinkpulseError, Result};
use crate::repository::models::{NewShortLink, NewVisitRecord, ShortLink, User, VisitRecord};
use crate::repository::{AliasStore, AnalyticsStore, UserStore};

use migration::{Migrator, MigratorTrait, entities::short_link, entities::user, entities::visit_record};

#[derive(Clone)]
pub struct SeaOrmRepository {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmRepository {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(LinkpulseError::database_config(
                "database_url is not set".to_string(),
            ));
        }

        let db = if backend_name == "sqlite" {
            Self::connect_sqlite(database_url).await?
        } else {
            Self::connect_generic(database_url, backend_name).await?
        };

        let repository = SeaOrmRepository {
            db,
            backend_name: backend_name.to_string(),
        };

        repository.run_migrations().await?;

        warn!(
            "{} repository initialized.",
            repository.backend_name.to_uppercase()
        );
        Ok(repository)
    }

    /// 连接 SQLite 数据库（带自动创建和性能优化）
    async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::SqlitePool;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                LinkpulseError::database_config(format!("invalid sqlite url: {}", e))
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePool::connect_with(opt).await.map_err(|e| {
            LinkpulseError::database_connection(format!("sqlite connect failed: {}", e))
        })?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 连接通用数据库（MySQL/PostgreSQL）
    async fn connect_generic(database_url: &str, backend_name: &str) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(database_url.to_owned());
        opt.max_connections(100)
            .min_connections(5)
            .connect_timeout(std::time::Duration::from_secs(8))
            .acquire_timeout(std::time::Duration::from_secs(8))
            .sqlx_logging(false);

        Database::connect(opt).await.map_err(|e| {
            LinkpulseError::database_connection(format!(
                "failed to connect to {}: {}",
                backend_name.to_uppercase(),
                e
            ))
        })
    }

    async fn run_migrations(&self) -> Result<()> {
        Migrator::up(&self.db, None)
            .await
            .map_err(|e| LinkpulseError::database_operation(format!("migration failed: {}", e)))?;

        info!("Database migrations completed");
        Ok(())
    }

    /// 区分唯一约束冲突与其他数据库错误
    fn map_insert_err(err: sea_orm::DbErr, conflict_msg: &str) -> LinkpulseError {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                LinkpulseError::conflict(conflict_msg.to_string())
            }
            _ => err.into(),
        }
    }

    fn link_from_model(model: short_link::Model) -> ShortLink {
        ShortLink {
            id: model.id,
            long_url: model.long_url,
            short_alias: model.short_alias,
            topic: model.topic,
            owner_id: model.owner_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    fn visit_from_model(model: visit_record::Model) -> VisitRecord {
        VisitRecord {
            id: model.id,
            url_id: model.url_id,
            visitor_key: model.visitor_key,
            clicks: model.clicks,
            os_type: model.os_type,
            device_type: model.device_type,
            ip_address: model.ip_address,
            country: model.country,
            region: model.region,
            city: model.city,
            date: model.date,
        }
    }

    fn user_from_model(model: user::Model) -> User {
        User {
            id: model.id,
            name: model.name,
            email: model.email,
            external_auth_id: model.external_auth_id,
        }
    }
}

#[async_trait]
impl AliasStore for SeaOrmRepository {
    async fn find_by_alias(&self, alias: &str) -> Result<Option<ShortLink>> {
        let model = short_link::Entity::find()
            .filter(short_link::Column::ShortAlias.eq(alias))
            .one(&self.db)
            .await?;
        Ok(model.map(Self::link_from_model))
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<ShortLink>> {
        let model = short_link::Entity::find()
            .filter(short_link::Column::LongUrl.eq(long_url))
            .one(&self.db)
            .await?;
        Ok(model.map(Self::link_from_model))
    }

    async fn create_link(&self, link: NewShortLink) -> Result<ShortLink> {
        use sea_orm::ActiveValue::Set;

        let now = Utc::now();
        let active = short_link::ActiveModel {
            long_url: Set(link.long_url),
            short_alias: Set(link.short_alias),
            topic: Set(link.topic),
            owner_id: Set(link.owner_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| Self::map_insert_err(e, "Custom alias already exists"))?;
        Ok(Self::link_from_model(model))
    }

    async fn find_by_topic(&self, topic: &str, owner_id: i64) -> Result<Vec<ShortLink>> {
        let models = short_link::Entity::find()
            .filter(short_link::Column::Topic.eq(topic))
            .filter(short_link::Column::OwnerId.eq(owner_id))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Self::link_from_model).collect())
    }

    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<ShortLink>> {
        let models = short_link::Entity::find()
            .filter(short_link::Column::OwnerId.eq(owner_id))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Self::link_from_model).collect())
    }
}

#[async_trait]
impl AnalyticsStore for SeaOrmRepository {
    async fn find_visit(
        &self,
        url_id: i64,
        visitor_key: &str,
        date: NaiveDate,
    ) -> Result<Option<VisitRecord>> {
        let model = visit_record::Entity::find()
            .filter(visit_record::Column::UrlId.eq(url_id))
            .filter(visit_record::Column::VisitorKey.eq(visitor_key))
            .filter(visit_record::Column::Date.eq(date))
            .one(&self.db)
            .await?;
        Ok(model.map(Self::visit_from_model))
    }

    async fn insert_visit(&self, visit: NewVisitRecord) -> Result<VisitRecord> {
        use sea_orm::ActiveValue::Set;

        let active = visit_record::ActiveModel {
            url_id: Set(visit.url_id),
            visitor_key: Set(visit.visitor_key),
            clicks: Set(1),
            os_type: Set(visit.os_type),
            device_type: Set(visit.device_type),
            ip_address: Set(visit.ip_address),
            country: Set(visit.country),
            region: Set(visit.region),
            city: Set(visit.city),
            date: Set(visit.date),
            ..Default::default()
        };

        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| Self::map_insert_err(e, "Visit row already exists for this day"))?;
        Ok(Self::visit_from_model(model))
    }

    async fn increment_clicks(&self, visit_id: i64) -> Result<()> {
        // 原子递增，避免读-改-写竞态
        visit_record::Entity::update_many()
            .col_expr(
                visit_record::Column::Clicks,
                Expr::col(visit_record::Column::Clicks).add(1),
            )
            .filter(visit_record::Column::Id.eq(visit_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn find_all_by_url_ids(&self, url_ids: &[i64]) -> Result<Vec<VisitRecord>> {
        if url_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = visit_record::Entity::find()
            .filter(visit_record::Column::UrlId.is_in(url_ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Self::visit_from_model).collect())
    }
}

#[async_trait]
impl UserStore for SeaOrmRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(Self::user_from_model))
    }
}
