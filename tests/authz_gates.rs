use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::{tempdir, TempDir};
use tower::util::ServiceExt;
use uuid::Uuid;

use flexwork::create_app;
use flexwork::jwt::JwtConfig;

// Org chart used throughout:
//   130001 MD (role 1, reports to itself)
//   140001 Director (role 1) under the MD, manages 140894 and 140895
//   160001 Director (role 1) under the MD, manages nobody
//   140894 Manager (role 3) under 140001, manages 140002 and 140003
//   140895 Manager (role 3) under 140001
//   140002 / 140003 Staff (role 2) under 140894
const EMPLOYEES: [(i64, &str, &str, i64, i64); 7] = [
    (130001, "Jack", "Sim", 1, 130001),
    (140001, "Derek", "Tan", 1, 130001),
    (160001, "Sally", "Loh", 1, 130001),
    (140894, "Rahim", "Khalid", 3, 140001),
    (140895, "Peter", "Yap", 3, 140001),
    (140002, "Susan", "Goh", 2, 140894),
    (140003, "Janice", "Chan", 2, 140894),
];

async fn setup() -> Result<(Router, SqlitePool, JwtConfig, TempDir)> {
    let dir = tempdir().context("failed to create tempdir")?;
    let db_path = dir.path().join("test_authz.db");
    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"))
        .await?;
    migrator.run(&pool).await?;

    for (staff_id, fname, lname, role, manager) in EMPLOYEES {
        sqlx::query(
            "INSERT INTO employees (staff_id, staff_fname, staff_lname, dept, position, role, reporting_manager) \
             VALUES (?, ?, ?, 'Sales', 'Employee', ?, ?)",
        )
        .bind(staff_id)
        .bind(fname)
        .bind(lname)
        .bind(role)
        .bind(manager)
        .execute(&pool)
        .await?;
    }

    std::env::set_var("JWT_SECRET", "test-secret");
    let app = create_app(pool.clone()).await?;
    let jwt = JwtConfig {
        secret: Arc::new(b"test-secret".to_vec()),
        exp_hours: 24,
    };

    Ok((app, pool, jwt, dir))
}

fn token_for(jwt: &JwtConfig, staff_id: i64, role: i64) -> String {
    jwt.encode(Uuid::new_v4(), Some(staff_id), role).expect("failed to mint token")
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("failed to build request")
}

async fn body_json(resp: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn org_view_is_director_only() -> Result<()> {
    let (app, _pool, jwt, _dir) = setup().await?;

    let director = token_for(&jwt, 140001, 1);
    let resp = app.clone().oneshot(get("/arrangements/org", Some(&director))).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    for (staff_id, role) in [(140894i64, 3i64), (140002, 2)] {
        let token = token_for(&jwt, staff_id, role);
        let resp = app.clone().oneshot(get("/arrangements/org", Some(&token))).await?;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "role {role} must not see the org view");
    }

    Ok(())
}

#[tokio::test]
async fn director_managing_nobody_still_sees_org() -> Result<()> {
    let (app, _pool, jwt, _dir) = setup().await?;

    // 160001 appears in nobody's reporting_manager column.
    let token = token_for(&jwt, 160001, 1);
    let resp = app.clone().oneshot(get("/arrangements/org", Some(&token))).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    // But the same director cannot act on approvals.
    let resp = app.clone().oneshot(get("/approvals", Some(&token))).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn missing_token_is_403_with_exact_body() -> Result<()> {
    let (app, _pool, _jwt, _dir) = setup().await?;

    let resp = app.clone().oneshot(get("/arrangements/me", None)).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = body_json(resp).await?;
    assert_eq!(body["error"], "Missing or invalid token");

    let resp = app.clone().oneshot(get("/arrangements/me", Some("not-a-jwt"))).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = body_json(resp).await?;
    assert_eq!(body["error"], "Missing or invalid token");

    Ok(())
}

#[tokio::test]
async fn missing_session_is_401_with_exact_body() -> Result<()> {
    let (app, _pool, _jwt, _dir) = setup().await?;

    let resp = app.clone().oneshot(get("/auth/me", None)).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await?;
    assert_eq!(body["error"], "Unauthorized");

    let req = Request::builder()
        .method("GET")
        .uri("/auth/me")
        .header("cookie", "session=garbage")
        .body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await?;
    assert_eq!(body["error"], "Unauthorized");

    Ok(())
}

#[tokio::test]
async fn missing_staff_id_claim_is_400() -> Result<()> {
    let (app, _pool, jwt, _dir) = setup().await?;

    let token = jwt.encode(Uuid::new_v4(), None, 1)?;
    let resp = app.clone().oneshot(get("/arrangements/me", Some(&token))).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await?;
    assert_eq!(body["error"], "Missing staff_id claim");

    Ok(())
}

#[tokio::test]
async fn unknown_employee_is_404_with_exact_body() -> Result<()> {
    let (app, _pool, jwt, _dir) = setup().await?;

    let token = token_for(&jwt, 999999, 1);
    let resp = app.clone().oneshot(get("/arrangements/me", Some(&token))).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await?;
    assert_eq!(body["error"], "Employee not found");

    Ok(())
}

#[tokio::test]
async fn team_view_branches_for_manager_and_staff() -> Result<()> {
    let (app, _pool, jwt, _dir) = setup().await?;

    // Manager branch: own reports plus the team under their own manager.
    let manager = token_for(&jwt, 140894, 3);
    let resp = app.clone().oneshot(get("/arrangements/team", Some(&manager))).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    let team: Vec<i64> = member_ids(&body["team"]);
    assert_eq!(team, vec![140002, 140003]);
    let upward: Vec<i64> = member_ids(&body["reporting_manager_team"]);
    assert_eq!(upward, vec![140895], "manager sees peers under their own manager");

    // Staff branch: peers only, no upward view.
    let staff = token_for(&jwt, 140002, 2);
    let resp = app.clone().oneshot(get("/arrangements/team", Some(&staff))).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    let team: Vec<i64> = member_ids(&body["team"]);
    assert_eq!(team, vec![140003]);
    assert!(body.get("reporting_manager_team").is_none());

    Ok(())
}

#[tokio::test]
async fn md_team_view_has_no_upward_key() -> Result<()> {
    let (app, _pool, jwt, _dir) = setup().await?;

    let md = token_for(&jwt, 130001, 1);
    let resp = app.clone().oneshot(get("/arrangements/team", Some(&md))).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    let team: Vec<i64> = member_ids(&body["team"]);
    assert_eq!(team, vec![140001, 160001]);
    assert!(
        body.get("reporting_manager_team").is_none(),
        "the MD reports to itself and must get no reporting-manager view"
    );

    Ok(())
}

#[tokio::test]
async fn team_view_rejects_unknown_roles() -> Result<()> {
    let (app, _pool, jwt, _dir) = setup().await?;

    for bad_role in [0i64, 4, 7] {
        let token = token_for(&jwt, 140002, bad_role);
        let resp = app.clone().oneshot(get("/arrangements/team", Some(&token))).await?;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "role {bad_role} must be denied");
        let body = body_json(resp).await?;
        assert_eq!(body["error"], "Invalid role");
    }

    Ok(())
}

#[tokio::test]
async fn approvals_require_managing_someone() -> Result<()> {
    let (app, _pool, jwt, _dir) = setup().await?;

    for (staff_id, role) in [(140894i64, 3i64), (140001, 1), (130001, 1)] {
        let token = token_for(&jwt, staff_id, role);
        let resp = app.clone().oneshot(get("/approvals", Some(&token))).await?;
        assert_eq!(resp.status(), StatusCode::OK, "{staff_id} manages someone");
        let resp = app.clone().oneshot(get("/withdrawals", Some(&token))).await?;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    for (staff_id, role) in [(140002i64, 2i64), (160001, 1)] {
        let token = token_for(&jwt, staff_id, role);
        let resp = app.clone().oneshot(get("/approvals", Some(&token))).await?;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{staff_id} manages nobody");
        let resp = app.clone().oneshot(get("/withdrawals", Some(&token))).await?;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    Ok(())
}

#[tokio::test]
async fn decisions_are_idempotent_across_repeats() -> Result<()> {
    let (app, _pool, jwt, _dir) = setup().await?;

    let token = token_for(&jwt, 140002, 2);
    for _ in 0..3 {
        let resp = app.clone().oneshot(get("/approvals", Some(&token))).await?;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let resp = app.clone().oneshot(get("/arrangements/me", Some(&token))).await?;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    Ok(())
}

#[tokio::test]
async fn claim_role_overrides_directory_role() -> Result<()> {
    let (app, pool, jwt, _dir) = setup().await?;

    // Stale directory row says role 2; the identity claim says director.
    sqlx::query("UPDATE employees SET role = 2 WHERE staff_id = 140001")
        .execute(&pool)
        .await?;

    let token = token_for(&jwt, 140001, 1);
    let resp = app.clone().oneshot(get("/arrangements/org", Some(&token))).await?;
    assert_eq!(resp.status(), StatusCode::OK, "claim role must win over the directory column");

    // And the other way round: a claim-demoted director is denied.
    let token = token_for(&jwt, 130001, 2);
    let resp = app.clone().oneshot(get("/arrangements/org", Some(&token))).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    Ok(())
}

fn member_ids(members: &Value) -> Vec<i64> {
    let mut ids: Vec<i64> = members
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|m| m["employee"]["staff_id"].as_i64())
                .collect()
        })
        .unwrap_or_default();
    ids.sort_unstable();
    ids
}
