//! 内存后端
//!
//! 用 DashMap 模拟持久层，主要服务于测试与本地试用。
//! 唯一约束（别名、邮箱、访问行上的 (url_id, visitor_key, date)）
//! 与数据库后端保持一致的 Conflict 语义。

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::errors::{LinkpulseError, Result};
use crate::repository::models::{NewShortLink, NewVisitRecord, ShortLink, User, VisitRecord};
use crate::repository::{AliasStore, AnalyticsStore, UserStore};

#[derive(Default)]
pub struct MemoryRepository {
    links: DashMap<i64, ShortLink>,
    visits: DashMap<i64, VisitRecord>,
    users: DashMap<i64, User>,
    /// alias -> link id
    alias_index: DashMap<String, i64>,
    /// (url_id, visitor_key, date) -> visit id
    visit_index: DashMap<(i64, String, NaiveDate), i64>,
    next_link_id: AtomicI64,
    next_visit_id: AtomicI64,
    next_user_id: AtomicI64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 测试辅助：注册一个用户并返回完整记录
    pub fn add_user(&self, name: &str, email: &str) -> User {
        let id = self.next_user_id.fetch_add(1, Ordering::Relaxed) + 1;
        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            external_auth_id: None,
        };
        self.users.insert(id, user.clone());
        user
    }
}

#[async_trait]
impl AliasStore for MemoryRepository {
    async fn find_by_alias(&self, alias: &str) -> Result<Option<ShortLink>> {
        Ok(self
            .alias_index
            .get(alias)
            .map(|id| *id)
            .and_then(|id| self.links.get(&id).map(|l| l.value().clone())))
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<ShortLink>> {
        Ok(self
            .links
            .iter()
            .find(|entry| entry.long_url == long_url)
            .map(|entry| entry.value().clone()))
    }

    async fn create_link(&self, link: NewShortLink) -> Result<ShortLink> {
        let id = self.next_link_id.fetch_add(1, Ordering::Relaxed) + 1;

        match self.alias_index.entry(link.short_alias.clone()) {
            Entry::Occupied(_) => {
                return Err(LinkpulseError::conflict("Custom alias already exists"));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(id);
            }
        }

        let now = Utc::now();
        let stored = ShortLink {
            id,
            long_url: link.long_url,
            short_alias: link.short_alias,
            topic: link.topic,
            owner_id: link.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.links.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_topic(&self, topic: &str, owner_id: i64) -> Result<Vec<ShortLink>> {
        Ok(self
            .links
            .iter()
            .filter(|entry| entry.owner_id == owner_id && entry.topic.as_deref() == Some(topic))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<ShortLink>> {
        Ok(self
            .links
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[async_trait]
impl AnalyticsStore for MemoryRepository {
    async fn find_visit(
        &self,
        url_id: i64,
        visitor_key: &str,
        date: NaiveDate,
    ) -> Result<Option<VisitRecord>> {
        let key = (url_id, visitor_key.to_string(), date);
        Ok(self
            .visit_index
            .get(&key)
            .map(|id| *id)
            .and_then(|id| self.visits.get(&id).map(|v| v.value().clone())))
    }

    async fn insert_visit(&self, visit: NewVisitRecord) -> Result<VisitRecord> {
        let id = self.next_visit_id.fetch_add(1, Ordering::Relaxed) + 1;
        let key = (visit.url_id, visit.visitor_key.clone(), visit.date);

        match self.visit_index.entry(key) {
            Entry::Occupied(_) => {
                return Err(LinkpulseError::conflict(
                    "Visit row already exists for this day",
                ));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(id);
            }
        }

        let stored = VisitRecord {
            id,
            url_id: visit.url_id,
            visitor_key: visit.visitor_key,
            clicks: 1,
            os_type: visit.os_type,
            device_type: visit.device_type,
            ip_address: visit.ip_address,
            country: visit.country,
            region: visit.region,
            city: visit.city,
            date: visit.date,
        };
        self.visits.insert(id, stored.clone());
        Ok(stored)
    }

    async fn increment_clicks(&self, visit_id: i64) -> Result<()> {
        match self.visits.get_mut(&visit_id) {
            Some(mut visit) => {
                visit.clicks += 1;
                Ok(())
            }
            None => Err(LinkpulseError::not_found(format!(
                "Visit record {} not found",
                visit_id
            ))),
        }
    }

    async fn find_all_by_url_ids(&self, url_ids: &[i64]) -> Result<Vec<VisitRecord>> {
        Ok(self
            .visits
            .iter()
            .filter(|entry| url_ids.contains(&entry.url_id))
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }
}
