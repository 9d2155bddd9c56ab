//! 分析聚合服务
//!
//! 三个只读视图：单别名、按 topic、owner 全量。
//! 聚合全部在类型化的 [`VisitRecord`] 行上完成，与存储访问解耦；
//! 分组结果按键排序输出，与行的迭代顺序无关。
//!
//! uniqueClicks 语义：去重后的归因身份数，不是点击总和 ——
//! 同一身份同日多次访问只计一次。

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::errors::{LinkpulseError, Result};
use crate::repository::{AliasStore, AnalyticsStore, ShortLink, VisitRecord};

/// 单别名视图的日期直方图窗口（含当日共 7 天）
const ALIAS_VIEW_WINDOW_DAYS: i64 = 6;

// ============ 聚合结果类型 ============

/// 某日的点击总数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateClicks {
    /// YYYY-MM-DD
    pub date: String,
    pub clicks: i64,
}

/// 按 OS / 设备分组的汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRollup {
    pub name: String,
    pub total_clicks: i64,
    pub unique_visitors: u64,
}

/// 单别名视图
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasAnalytics {
    pub total_clicks: i64,
    pub unique_clicks: u64,
    pub clicks_by_date: Vec<DateClicks>,
    pub os_type: Vec<CategoryRollup>,
    pub device_type: Vec<CategoryRollup>,
}

/// topic 视图里的单条 URL 汇总
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicUrlStat {
    pub short_url: String,
    pub total_clicks: i64,
    pub unique_clicks: u64,
}

/// topic 视图
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAnalytics {
    pub total_clicks: i64,
    pub unique_clicks: u64,
    pub clicks_by_date: Vec<DateClicks>,
    pub os_type: Vec<CategoryRollup>,
    pub device_type: Vec<CategoryRollup>,
    pub urls: Vec<TopicUrlStat>,
}

/// owner 全量视图
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallAnalytics {
    pub total_urls: usize,
    pub total_clicks: i64,
    pub unique_clicks: u64,
    pub clicks_by_date: Vec<DateClicks>,
    pub os_type: Vec<CategoryRollup>,
    pub device_type: Vec<CategoryRollup>,
}

// ============ 纯聚合函数 ============

pub fn total_clicks(rows: &[VisitRecord]) -> i64 {
    rows.iter().map(|row| row.clicks).sum()
}

pub fn unique_visitors(rows: &[VisitRecord]) -> u64 {
    rows.iter()
        .map(|row| row.visitor_key.as_str())
        .collect::<HashSet<_>>()
        .len() as u64
}

/// 按日期分组求和。`since` 给定时只保留该日期（含）之后的行。
pub fn clicks_by_date(rows: &[VisitRecord], since: Option<NaiveDate>) -> Vec<DateClicks> {
    let mut grouped: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for row in rows {
        if let Some(cutoff) = since {
            if row.date < cutoff {
                continue;
            }
        }
        *grouped.entry(row.date).or_insert(0) += row.clicks;
    }

    grouped
        .into_iter()
        .map(|(date, clicks)| DateClicks {
            date: date.format("%Y-%m-%d").to_string(),
            clicks,
        })
        .collect()
}

/// 按任意维度分组：每组 clicks 求和 + 去重身份数，按组名排序
pub fn rollup_by<F>(rows: &[VisitRecord], key: F) -> Vec<CategoryRollup>
where
    F: Fn(&VisitRecord) -> &str,
{
    let mut grouped: BTreeMap<&str, (i64, HashSet<&str>)> = BTreeMap::new();
    for row in rows {
        let entry = grouped.entry(key(row)).or_default();
        entry.0 += row.clicks;
        entry.1.insert(row.visitor_key.as_str());
    }

    grouped
        .into_iter()
        .map(|(name, (clicks, visitors))| CategoryRollup {
            name: name.to_string(),
            total_clicks: clicks,
            unique_visitors: visitors.len() as u64,
        })
        .collect()
}

pub fn os_rollup(rows: &[VisitRecord]) -> Vec<CategoryRollup> {
    rollup_by(rows, |row| row.os_type.as_str())
}

pub fn device_rollup(rows: &[VisitRecord]) -> Vec<CategoryRollup> {
    rollup_by(rows, |row| row.device_type.as_str())
}

// ============ AnalyticsService ============

pub struct AnalyticsService {
    links: Arc<dyn AliasStore>,
    analytics: Arc<dyn AnalyticsStore>,
    base_url: String,
}

impl AnalyticsService {
    pub fn new(
        links: Arc<dyn AliasStore>,
        analytics: Arc<dyn AnalyticsStore>,
        base_url: &str,
    ) -> Self {
        Self {
            links,
            analytics,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn render_short_url(&self, alias: &str) -> String {
        format!("{}/api/shorten/{}", self.base_url, alias)
    }

    /// 单别名视图：日期直方图限制在近 7 天
    pub async fn get_by_alias(&self, alias: &str, owner_id: i64) -> Result<AliasAnalytics> {
        let link = self
            .links
            .find_by_alias(alias)
            .await?
            .filter(|link| link.owner_id == owner_id)
            .ok_or_else(|| LinkpulseError::not_found("Short URL not found"))?;

        let rows = self.analytics.find_all_by_url_ids(&[link.id]).await?;
        let window_start = Utc::now().date_naive() - Duration::days(ALIAS_VIEW_WINDOW_DAYS);

        Ok(AliasAnalytics {
            total_clicks: total_clicks(&rows),
            unique_clicks: unique_visitors(&rows),
            clicks_by_date: clicks_by_date(&rows, Some(window_start)),
            os_type: os_rollup(&rows),
            device_type: device_rollup(&rows),
        })
    }

    /// topic 视图：汇总 + 每条 URL 的小计，日期直方图为全量范围
    pub async fn get_by_topic(&self, topic: &str, owner_id: i64) -> Result<TopicAnalytics> {
        let links = self.links.find_by_topic(topic, owner_id).await?;
        if links.is_empty() {
            return Err(LinkpulseError::not_found("No URLs found under this topic"));
        }

        let (rows, urls) = self.collect_rows_with_stats(&links).await?;

        Ok(TopicAnalytics {
            total_clicks: total_clicks(&rows),
            unique_clicks: unique_visitors(&rows),
            clicks_by_date: clicks_by_date(&rows, None),
            os_type: os_rollup(&rows),
            device_type: device_rollup(&rows),
            urls,
        })
    }

    /// owner 全量视图
    pub async fn get_overall(&self, owner_id: i64) -> Result<OverallAnalytics> {
        let links = self.links.find_by_owner(owner_id).await?;
        if links.is_empty() {
            return Err(LinkpulseError::not_found("No URLs found for this user"));
        }

        let url_ids: Vec<i64> = links.iter().map(|link| link.id).collect();
        let rows = self.analytics.find_all_by_url_ids(&url_ids).await?;

        Ok(OverallAnalytics {
            total_urls: links.len(),
            total_clicks: total_clicks(&rows),
            unique_clicks: unique_visitors(&rows),
            clicks_by_date: clicks_by_date(&rows, None),
            os_type: os_rollup(&rows),
            device_type: device_rollup(&rows),
        })
    }

    async fn collect_rows_with_stats(
        &self,
        links: &[ShortLink],
    ) -> Result<(Vec<VisitRecord>, Vec<TopicUrlStat>)> {
        let url_ids: Vec<i64> = links.iter().map(|link| link.id).collect();
        let rows = self.analytics.find_all_by_url_ids(&url_ids).await?;

        let mut urls = Vec::with_capacity(links.len());
        for link in links {
            let link_rows: Vec<VisitRecord> = rows
                .iter()
                .filter(|row| row.url_id == link.id)
                .cloned()
                .collect();
            urls.push(TopicUrlStat {
                short_url: self.render_short_url(&link.short_alias),
                total_clicks: total_clicks(&link_rows),
                unique_clicks: unique_visitors(&link_rows),
            });
        }

        Ok((rows, urls))
    }
}
