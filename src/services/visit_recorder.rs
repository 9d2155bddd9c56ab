//! 访问记录器
//!
//! 重定向成功后记录一次访问：解析 UA、查询 GeoIP、取 UTC 日历日，
//! 对 (url_id, visitor_key, date) 做幂等 upsert —— 同日同身份重复访问
//! 只递增 clicks，不产生新行。
//!
//! 并发竞态：两次同日访问可能都观察到"无现有行"并尝试插入，
//! 输掉唯一约束仲裁的一方把 Conflict 当作"行已存在"，改走递增。

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::errors::{LinkpulseError, Result};
use crate::repository::{AnalyticsStore, NewVisitRecord};
use crate::services::geoip::GeoIpProvider;
use crate::utils::ua::parse_user_agent;

const UNKNOWN: &str = "Unknown";

/// 一次访问的请求侧属性
#[derive(Debug, Clone)]
pub struct VisitContext {
    /// 归因身份：用户 id 或匿名指纹
    pub visitor_key: String,
    pub user_agent: String,
    pub ip: String,
}

pub struct VisitRecorder {
    analytics: Arc<dyn AnalyticsStore>,
    geoip: Arc<GeoIpProvider>,
}

impl VisitRecorder {
    pub fn new(analytics: Arc<dyn AnalyticsStore>, geoip: Arc<GeoIpProvider>) -> Self {
        Self { analytics, geoip }
    }

    /// 记录一次访问（以当前 UTC 日期为键）
    pub async fn record(&self, url_id: i64, visit: &VisitContext) -> Result<()> {
        self.record_on(url_id, visit, Utc::now().date_naive()).await
    }

    /// 以指定日期记录，便于测试跨日语义
    pub async fn record_on(
        &self,
        url_id: i64,
        visit: &VisitContext,
        date: NaiveDate,
    ) -> Result<()> {
        let ua = parse_user_agent(&visit.user_agent);

        // GeoIP 失败不阻塞记录，全部回落为 Unknown
        let geo = self.geoip.lookup(&visit.ip).await.unwrap_or_default();
        let country = geo.country.unwrap_or_else(|| UNKNOWN.to_string());
        let region = geo.region.unwrap_or_else(|| UNKNOWN.to_string());
        let city = geo.city.unwrap_or_else(|| UNKNOWN.to_string());

        if let Some(existing) = self
            .analytics
            .find_visit(url_id, &visit.visitor_key, date)
            .await?
        {
            debug!(
                "Incrementing visit row {} for url {} on {}",
                existing.id, url_id, date
            );
            return self.analytics.increment_clicks(existing.id).await;
        }

        let new_visit = NewVisitRecord {
            url_id,
            visitor_key: visit.visitor_key.clone(),
            os_type: ua.os,
            device_type: ua.device,
            ip_address: if visit.ip.is_empty() {
                UNKNOWN.to_string()
            } else {
                visit.ip.clone()
            },
            country,
            region,
            city,
            date,
        };

        match self.analytics.insert_visit(new_visit).await {
            Ok(_) => Ok(()),
            Err(LinkpulseError::Conflict(_)) => {
                // 并发插入输掉了仲裁：行现在必然存在，改为递增
                debug!(
                    "Concurrent insert for url {} on {}, retrying as increment",
                    url_id, date
                );
                match self
                    .analytics
                    .find_visit(url_id, &visit.visitor_key, date)
                    .await?
                {
                    Some(existing) => self.analytics.increment_clicks(existing.id).await,
                    None => Err(LinkpulseError::database_operation(
                        "Visit row vanished after unique-constraint conflict",
                    )),
                }
            }
            Err(e) => Err(e),
        }
    }
}
