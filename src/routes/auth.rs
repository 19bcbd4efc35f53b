use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::app::AppState;
use crate::authz::{Authorized, EmployeeDirectory, Session, ViewOwn};
use crate::errors::{AppError, AppResult};
use crate::models::credential::{AuthResponse, DbCredential, LoginRequest};
use crate::models::employee::Employee;
use crate::utils::verify_password;

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let credential = sqlx::query_as::<_, DbCredential>(
        "SELECT auth_id, staff_id, email, password_hash, role FROM credentials WHERE email = ?",
    )
    .bind(&payload.email)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    let password_ok = verify_password(&payload.password, &credential.password_hash)?;
    if !password_ok {
        return Err(AppError::unauthorized("invalid credentials"));
    }

    let directory = EmployeeDirectory::new(state.pool.clone());
    let mut employee = directory.lookup(credential.staff_id).await?;
    // Token carries the metadata role; reflect it in the response too.
    employee.role = credential.role;

    let token = state
        .jwt
        .encode(credential.auth_id, Some(credential.staff_id), credential.role)?;

    let cookie = Cookie::build(("session", token.clone()))
        .path("/")
        .http_only(true)
        .build();

    Ok((jar.add(cookie), Json(AuthResponse { token, employee })))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current employee", body = Employee),
        (status = 401, description = "No session")
    )
)]
pub async fn me(auth: Authorized<ViewOwn, Session>) -> AppResult<Json<Employee>> {
    Ok(Json(auth.employee))
}
