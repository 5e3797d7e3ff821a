mod common;

use serde_json::Value;
use std::sync::Arc;
use swifturl::infrastructure::cache::{MemoryCache, NullCache};

#[tokio::test]
async fn test_health_check() {
    let app = common::test_app();

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "OK");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["uptime"].is_u64());
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_detailed_health_reports_backends() {
    let app = common::test_app();

    let response = app.server.get("/api/health/detailed").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "OK");
    assert_eq!(json["database"], "connected");
    assert_eq!(json["cache"], "connected");
    assert_eq!(json["clickQueue"]["open"], true);
    assert_eq!(json["clickQueue"]["availableCapacity"], 100);
}

#[tokio::test]
async fn test_detailed_health_with_cache_disabled_is_ok() {
    let settings = common::settings();
    let unused = Arc::new(MemoryCache::new(settings.cache_ttl));
    let app = common::test_app_with_cache(settings, Arc::new(NullCache::new()), unused);

    let response = app.server.get("/api/health/detailed").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "OK");
    assert_eq!(json["cache"], "disabled");
}
