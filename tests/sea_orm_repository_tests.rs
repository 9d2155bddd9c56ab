//! SeaOrmRepository tests (sqlite)
//!
//! 临时目录里的真实 sqlite 文件：迁移、唯一索引与
//! 数据库层的 Conflict 映射。内存后端只模拟这些语义，
//! 这里验证生产路径。

use chrono::NaiveDate;
use tempfile::TempDir;

use linkpulse::errors::LinkpulseError;
use linkpulse::repository::backends::sea_orm::SeaOrmRepository;
use linkpulse::repository::{AliasStore, AnalyticsStore, NewShortLink, NewVisitRecord};

async fn sqlite_repo() -> (TempDir, SeaOrmRepository) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let repo = SeaOrmRepository::new(&url, "sqlite").await.unwrap();
    (dir, repo)
}

fn new_link(alias: &str, url: &str) -> NewShortLink {
    NewShortLink {
        long_url: url.to_string(),
        short_alias: alias.to_string(),
        topic: None,
        owner_id: 1,
    }
}

fn new_visit(url_id: i64, key: &str, date: NaiveDate) -> NewVisitRecord {
    NewVisitRecord {
        url_id,
        visitor_key: key.to_string(),
        os_type: "Linux".to_string(),
        device_type: "Desktop".to_string(),
        ip_address: "203.0.113.7".to_string(),
        country: "Unknown".to_string(),
        region: "Unknown".to_string(),
        city: "Unknown".to_string(),
        date,
    }
}

// =============================================================================
// 短链：唯一别名索引
// =============================================================================

#[tokio::test]
async fn test_link_roundtrip_and_alias_lookup() {
    let (_dir, repo) = sqlite_repo().await;

    let created = repo
        .create_link(new_link("abc12345", "https://example.com"))
        .await
        .unwrap();
    assert_eq!(created.short_alias, "abc12345");

    let found = repo.find_by_alias("abc12345").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.long_url, "https://example.com");

    assert!(repo.find_by_alias("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_alias_maps_to_conflict() {
    let (_dir, repo) = sqlite_repo().await;

    repo.create_link(new_link("taken", "https://a.example"))
        .await
        .unwrap();

    // 唯一索引违例必须映射为 Conflict，而不是通用的数据库错误
    let err = repo
        .create_link(new_link("taken", "https://b.example"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LinkpulseError::Conflict("Custom alias already exists".to_string())
    );
}

// =============================================================================
// 访问行：(url_id, visitor_key, date) 仲裁约束
// =============================================================================

#[tokio::test]
async fn test_visit_upsert_key_maps_to_conflict() {
    let (_dir, repo) = sqlite_repo().await;
    let link = repo
        .create_link(new_link("visit001", "https://example.com"))
        .await
        .unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

    let first = repo
        .insert_visit(new_visit(link.id, "user:1", date))
        .await
        .unwrap();
    assert_eq!(first.clicks, 1);

    // 同键第二次插入走 Conflict，调用方据此改走递增路径
    let err = repo
        .insert_visit(new_visit(link.id, "user:1", date))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LinkpulseError::Conflict("Visit row already exists for this day".to_string())
    );

    // 换身份或换日期都不冲突
    repo.insert_visit(new_visit(link.id, "user:2", date))
        .await
        .unwrap();
    let next_day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    repo.insert_visit(new_visit(link.id, "user:1", next_day))
        .await
        .unwrap();

    let rows = repo.find_all_by_url_ids(&[link.id]).await.unwrap();
    assert_eq!(rows.len(), 3);
}

#[tokio::test]
async fn test_increment_clicks_persists() {
    let (_dir, repo) = sqlite_repo().await;
    let link = repo
        .create_link(new_link("click001", "https://example.com"))
        .await
        .unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

    let visit = repo
        .insert_visit(new_visit(link.id, "user:1", date))
        .await
        .unwrap();
    repo.increment_clicks(visit.id).await.unwrap();
    repo.increment_clicks(visit.id).await.unwrap();

    let found = repo
        .find_visit(link.id, "user:1", date)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.clicks, 3);
}
