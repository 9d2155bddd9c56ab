//! VisitRecorder tests
//!
//! Upsert 语义、并发插入的 Conflict 重试、UA/Geo 缺省值。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use linkpulse::config::GeoIpConfig;
use linkpulse::errors::{LinkpulseError, Result};
use linkpulse::repository::backends::memory::MemoryRepository;
use linkpulse::repository::{AnalyticsStore, NewVisitRecord, VisitRecord};
use linkpulse::services::geoip::{GeoInfo, GeoIpLookup, GeoIpProvider};
use linkpulse::services::{VisitContext, VisitRecorder};

fn visit(key: &str, ua: &str, ip: &str) -> VisitContext {
    VisitContext {
        visitor_key: key.to_string(),
        user_agent: ua.to_string(),
        ip: ip.to_string(),
    }
}

fn disabled_geo() -> Arc<GeoIpProvider> {
    Arc::new(GeoIpProvider::new(&GeoIpConfig::default()))
}

// =============================================================================
// Upsert 语义
// =============================================================================

#[tokio::test]
async fn test_n_visits_one_row_n_clicks() {
    let repo = Arc::new(MemoryRepository::new());
    let recorder = VisitRecorder::new(repo.clone(), disabled_geo());
    let ctx = visit("user:1", "curl/8.0", "203.0.113.5");

    for _ in 0..5 {
        recorder.record(42, &ctx).await.unwrap();
    }

    let rows = repo.find_all_by_url_ids(&[42]).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].clicks, 5);
}

#[tokio::test]
async fn test_different_days_get_different_rows() {
    let repo = Arc::new(MemoryRepository::new());
    let recorder = VisitRecorder::new(repo.clone(), disabled_geo());
    let ctx = visit("user:1", "curl/8.0", "203.0.113.5");

    let day1 = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let day2 = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    recorder.record_on(42, &ctx, day1).await.unwrap();
    recorder.record_on(42, &ctx, day2).await.unwrap();

    let rows = repo.find_all_by_url_ids(&[42]).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.clicks == 1));
}

// =============================================================================
// 缺省值
// =============================================================================

#[tokio::test]
async fn test_unparseable_ua_and_disabled_geo_default() {
    let repo = Arc::new(MemoryRepository::new());
    let recorder = VisitRecorder::new(repo.clone(), disabled_geo());
    let ctx = visit("user:1", "garbage-ua", "203.0.113.5");

    recorder.record(7, &ctx).await.unwrap();

    let rows = repo.find_all_by_url_ids(&[7]).await.unwrap();
    assert_eq!(rows[0].os_type, "Unknown");
    assert_eq!(rows[0].device_type, "Desktop");
    assert_eq!(rows[0].country, "Unknown");
    assert_eq!(rows[0].region, "Unknown");
    assert_eq!(rows[0].city, "Unknown");
}

struct FixedGeo;

#[async_trait]
impl GeoIpLookup for FixedGeo {
    async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
        Some(GeoInfo {
            country: Some("DE".to_string()),
            region: Some("BE".to_string()),
            city: Some("Berlin".to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "Fixed"
    }
}

#[tokio::test]
async fn test_geo_fields_are_stamped() {
    let repo = Arc::new(MemoryRepository::new());
    let geoip = Arc::new(GeoIpProvider::with_lookup(Arc::new(FixedGeo)));
    let recorder = VisitRecorder::new(repo.clone(), geoip);

    recorder
        .record(7, &visit("user:1", "curl/8.0", "203.0.113.5"))
        .await
        .unwrap();

    let rows = repo.find_all_by_url_ids(&[7]).await.unwrap();
    assert_eq!(rows[0].country, "DE");
    assert_eq!(rows[0].region, "BE");
    assert_eq!(rows[0].city, "Berlin");
}

// =============================================================================
// 并发仲裁：输掉插入的一方改走递增
// =============================================================================

/// 模拟竞态：预检查看不到行，插入撞唯一约束，重查能看到行。
struct RaceyStore {
    inner: Arc<MemoryRepository>,
    find_calls: AtomicUsize,
}

#[async_trait]
impl AnalyticsStore for RaceyStore {
    async fn find_visit(
        &self,
        url_id: i64,
        visitor_key: &str,
        date: NaiveDate,
    ) -> Result<Option<VisitRecord>> {
        // 第一次查询发生在并发写者提交之前
        if self.find_calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(None);
        }
        self.inner.find_visit(url_id, visitor_key, date).await
    }

    async fn insert_visit(&self, _visit: NewVisitRecord) -> Result<VisitRecord> {
        Err(LinkpulseError::conflict(
            "Visit row already exists for this day",
        ))
    }

    async fn increment_clicks(&self, visit_id: i64) -> Result<()> {
        self.inner.increment_clicks(visit_id).await
    }

    async fn find_all_by_url_ids(&self, url_ids: &[i64]) -> Result<Vec<VisitRecord>> {
        self.inner.find_all_by_url_ids(url_ids).await
    }
}

#[tokio::test]
async fn test_lost_insert_race_retries_as_increment() {
    let inner = Arc::new(MemoryRepository::new());
    let today = Utc::now().date_naive();

    // 并发写者已经落了一行
    inner
        .insert_visit(NewVisitRecord {
            url_id: 42,
            visitor_key: "user:1".to_string(),
            os_type: "Linux".to_string(),
            device_type: "Desktop".to_string(),
            ip_address: "203.0.113.5".to_string(),
            country: "Unknown".to_string(),
            region: "Unknown".to_string(),
            city: "Unknown".to_string(),
            date: today,
        })
        .await
        .unwrap();

    let racey = Arc::new(RaceyStore {
        inner: inner.clone(),
        find_calls: AtomicUsize::new(0),
    });
    let recorder = VisitRecorder::new(racey, disabled_geo());

    recorder
        .record(42, &visit("user:1", "curl/8.0", "203.0.113.5"))
        .await
        .unwrap();

    // 没有第二行，原行被递增
    let rows = inner.find_all_by_url_ids(&[42]).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].clicks, 2);
}
