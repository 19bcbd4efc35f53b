use anyhow::Result;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::tempdir;
use tower::util::ServiceExt; // for `oneshot`

use flexwork::create_app;

#[tokio::test]
async fn health_reports_directory_reachable() -> Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("test_health.db");
    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")).await?;
    migrator.run(&pool).await?;

    std::env::set_var("JWT_SECRET", "test-secret");
    let app = create_app(pool.clone()).await?;

    // Fresh database: reachable but empty directory.
    let req = Request::builder().method("GET").uri("/api/health").body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let v: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(v["db_ok"], true, "expected db_ok: true, got: {}", v);
    assert_eq!(v["directory_size"], 0);

    // The reported size tracks the employees table.
    sqlx::query(
        "INSERT INTO employees (staff_id, staff_fname, staff_lname, dept, position, role, reporting_manager) \
         VALUES (130001, 'Jack', 'Sim', 'CEO', 'MD', 1, 130001)",
    )
    .execute(&pool)
    .await?;

    let req = Request::builder().method("GET").uri("/api/health").body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let v: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(v["directory_size"], 1);

    Ok(())
}
