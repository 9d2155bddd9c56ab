//! 仓库层领域模型

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 短链记录
///
/// `short_alias` 全局唯一，创建后不可变；`long_url` 非空。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: i64,
    pub long_url: String,
    pub short_alias: String,
    pub topic: Option<String>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 待插入的短链（id 由存储层分配）
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub long_url: String,
    pub short_alias: String,
    pub topic: Option<String>,
    pub owner_id: i64,
}

/// 每日访问行
///
/// 唯一键 (url_id, visitor_key, date)：同一归因身份同日重复访问
/// 只递增 `clicks`，不产生新行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: i64,
    pub url_id: i64,
    pub visitor_key: String,
    pub clicks: i64,
    pub os_type: String,
    pub device_type: String,
    pub ip_address: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub date: NaiveDate,
}

/// 待插入的访问行（clicks 从 1 起）
#[derive(Debug, Clone)]
pub struct NewVisitRecord {
    pub url_id: i64,
    pub visitor_key: String,
    pub os_type: String,
    pub device_type: String,
    pub ip_address: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub date: NaiveDate,
}

/// 用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub external_auth_id: Option<String>,
}
