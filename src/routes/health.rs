use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sqlx::query_scalar;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::errors::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub db_ok: bool,
    pub db_error: Option<String>,
    /// Size of the employee directory; None when the database is unreachable.
    pub directory_size: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Health check", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    // Count the directory rather than `SELECT 1`: every authorization
    // decision depends on the employees table being reachable.
    let directory_check = query_scalar::<_, i64>("SELECT COUNT(1) FROM employees")
        .fetch_one(&state.pool)
        .await;

    let response = match directory_check {
        Ok(count) => HealthResponse {
            status: "ok",
            db_ok: true,
            db_error: None,
            directory_size: Some(count),
        },
        Err(e) => HealthResponse {
            status: "ok",
            db_ok: false,
            db_error: Some(e.to_string()),
            directory_size: None,
        },
    };

    Ok(Json(response))
}
