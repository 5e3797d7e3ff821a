//! PostgreSQL repository tests. Need `DATABASE_URL` pointing at a server where
//! the test user may create databases; run with `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use swifturl::domain::entities::NewUrlRecord;
use swifturl::domain::repositories::UrlRepository;
use swifturl::error::AppError;
use swifturl::infrastructure::persistence::PgUrlRepository;

fn new_record(code: &str) -> NewUrlRecord {
    NewUrlRecord {
        long_url: format!("https://example.com/{code}"),
        short_code: code.to_string(),
        expires_at: None,
    }
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_insert_and_find(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    let created = repo.insert(new_record("abc123")).await.unwrap();
    assert_eq!(created.short_code, "abc123");
    assert_eq!(created.clicks, 0);

    let found = repo.find_by_code("abc123").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.long_url, "https://example.com/abc123");

    assert!(repo.find_by_code("missing").await.unwrap().is_none());
    assert!(repo.exists("abc123").await.unwrap());
    assert!(!repo.exists("missing").await.unwrap());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_code_is_taken(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    repo.insert(new_record("dup001")).await.unwrap();
    let result = repo.insert(new_record("dup001")).await;

    assert!(matches!(result, Err(AppError::CustomCodeTaken { .. })));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_increment_clicks(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    repo.insert(new_record("clk001")).await.unwrap();

    assert!(repo.increment_clicks("clk001", 1).await.unwrap());
    assert!(repo.increment_clicks("clk001", 2).await.unwrap());
    assert!(!repo.increment_clicks("gone01", 1).await.unwrap());

    let record = repo.find_by_code("clk001").await.unwrap().unwrap();
    assert_eq!(record.clicks, 3);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_list_newest_first(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    for code in ["one001", "two002", "three3"] {
        repo.insert(new_record(code)).await.unwrap();
    }

    let page = repo.list(2, 0).await.unwrap();
    let codes: Vec<&str> = page.iter().map(|r| r.short_code.as_str()).collect();
    assert_eq!(codes, vec!["three3", "two002"]);

    let rest = repo.list(2, 2).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].short_code, "one001");
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_expired_and_stats(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    let now = Utc::now();

    repo.insert(NewUrlRecord {
        expires_at: Some(now - Duration::hours(1)),
        ..new_record("old001")
    })
    .await
    .unwrap();
    repo.insert(NewUrlRecord {
        expires_at: Some(now + Duration::hours(1)),
        ..new_record("new001")
    })
    .await
    .unwrap();
    repo.insert(new_record("keep01")).await.unwrap();

    let stats = repo.cleanup_stats(now).await.unwrap();
    assert_eq!(stats.total_urls, 3);
    assert_eq!(stats.urls_with_expiry, 2);
    assert_eq!(stats.expired_urls, 1);

    let deleted = repo.delete_expired(now).await.unwrap();
    assert_eq!(deleted, vec!["old001".to_string()]);
    assert!(repo.find_by_code("old001").await.unwrap().is_none());
    assert!(repo.find_by_code("new001").await.unwrap().is_some());

    assert!(repo.find_by_code("keep01").await.unwrap().is_some());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_expired_by_code_spares_live_records(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    let now = Utc::now();

    repo.insert(NewUrlRecord {
        expires_at: Some(now - Duration::minutes(5)),
        ..new_record("old002")
    })
    .await
    .unwrap();
    repo.insert(NewUrlRecord {
        expires_at: Some(now + Duration::minutes(5)),
        ..new_record("live02")
    })
    .await
    .unwrap();
    repo.insert(new_record("keep02")).await.unwrap();

    assert!(repo.delete_expired_by_code("old002", now).await.unwrap());
    assert!(!repo.delete_expired_by_code("old002", now).await.unwrap());
    assert!(!repo.delete_expired_by_code("live02", now).await.unwrap());
    assert!(!repo.delete_expired_by_code("keep02", now).await.unwrap());

    assert!(repo.find_by_code("live02").await.unwrap().is_some());
    assert!(repo.find_by_code("keep02").await.unwrap().is_some());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_ping_and_analyze(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    repo.insert(new_record("ana001")).await.unwrap();

    repo.ping().await.unwrap();
    assert!(repo.analyze().await.is_ok());
}
