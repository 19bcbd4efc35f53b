use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{Authorized, ViewOrg, ViewOwn, ViewTeam};
use crate::errors::{AppError, AppResult};
use crate::models::arrangement::{slot, status, Arrangement, ArrangementCreateRequest};
use crate::models::employee::Employee;
use crate::utils::utc_now;

/// One employee's record together with their arrangements.
#[derive(Debug, Serialize, ToSchema)]
pub struct MemberArrangements {
    pub employee: Employee,
    pub arrangements: Vec<Arrangement>,
}

/// Team view. `reporting_manager_team` is absent for staff-branch callers
/// and for the MD, who has no superior.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamArrangementsResponse {
    pub team: Vec<MemberArrangements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporting_manager_team: Option<Vec<MemberArrangements>>,
}

#[utoipa::path(
    post,
    path = "/arrangements",
    tag = "Arrangements",
    request_body = ArrangementCreateRequest,
    responses(
        (status = 201, description = "Arrangement requested", body = Arrangement),
        (status = 409, description = "Duplicate date and slot")
    ),
    security(("bearerAuth" = []))
)]
pub async fn apply(
    State(state): State<AppState>,
    auth: Authorized<ViewOwn>,
    Json(payload): Json<ArrangementCreateRequest>,
) -> AppResult<(StatusCode, Json<Arrangement>)> {
    if !slot::is_valid(&payload.slot) {
        return Err(AppError::bad_request("slot must be AM, PM or FULL"));
    }

    let staff_id = auth.employee.staff_id;
    let duplicates: i64 = sqlx::query_scalar(
        "SELECT COUNT(1) FROM arrangements WHERE staff_id = ? AND arrangement_date = ? AND slot = ? \
         AND status NOT IN (?, ?)",
    )
    .bind(staff_id)
    .bind(payload.arrangement_date)
    .bind(&payload.slot)
    .bind(status::REJECTED)
    .bind(status::WITHDRAWN)
    .fetch_one(&state.pool)
    .await?;

    if duplicates > 0 {
        return Err(AppError::conflict("an arrangement already exists for that date and slot"));
    }

    let now = utc_now();
    let arrangement = Arrangement {
        id: Uuid::new_v4(),
        staff_id,
        arrangement_date: payload.arrangement_date,
        slot: payload.slot,
        status: status::PENDING.to_string(),
        reason: payload.reason,
        remarks: None,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO arrangements (id, staff_id, arrangement_date, slot, status, reason, remarks, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(arrangement.id)
    .bind(arrangement.staff_id)
    .bind(arrangement.arrangement_date)
    .bind(&arrangement.slot)
    .bind(&arrangement.status)
    .bind(&arrangement.reason)
    .bind(&arrangement.remarks)
    .bind(arrangement.created_at)
    .bind(arrangement.updated_at)
    .execute(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(arrangement)))
}

#[utoipa::path(
    get,
    path = "/arrangements/me",
    tag = "Arrangements",
    responses((status = 200, description = "Own arrangements", body = Vec<Arrangement>)),
    security(("bearerAuth" = []))
)]
pub async fn list_own(
    State(state): State<AppState>,
    auth: Authorized<ViewOwn>,
) -> AppResult<Json<Vec<Arrangement>>> {
    let arrangements = arrangements_for(&state.pool, auth.employee.staff_id).await?;
    Ok(Json(arrangements))
}

#[utoipa::path(
    get,
    path = "/arrangements/team",
    tag = "Arrangements",
    responses(
        (status = 200, description = "Team arrangements", body = TeamArrangementsResponse),
        (status = 403, description = "Invalid role")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_team(
    State(state): State<AppState>,
    auth: Authorized<ViewTeam>,
) -> AppResult<Json<TeamArrangementsResponse>> {
    let employee = &auth.employee;
    let grant = auth.grant;

    if grant.manager_or_director {
        let team = member_arrangements_under(&state.pool, employee.staff_id, employee.staff_id).await?;

        // The MD reports to itself; there is no upward view to attach.
        let reporting_manager_team = match employee.reporting_manager {
            Some(manager_id) if !grant.top_of_hierarchy => {
                Some(member_arrangements_under(&state.pool, manager_id, employee.staff_id).await?)
            }
            _ => None,
        };

        return Ok(Json(TeamArrangementsResponse { team, reporting_manager_team }));
    }

    // Staff branch: peers under the same reporting manager.
    let team = match employee.reporting_manager {
        Some(manager_id) => member_arrangements_under(&state.pool, manager_id, employee.staff_id).await?,
        None => Vec::new(),
    };

    Ok(Json(TeamArrangementsResponse { team, reporting_manager_team: None }))
}

#[utoipa::path(
    get,
    path = "/arrangements/org",
    tag = "Arrangements",
    responses(
        (status = 200, description = "Organization-wide arrangements", body = Vec<MemberArrangements>),
        (status = 403, description = "Directors only")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_org(
    State(state): State<AppState>,
    _auth: Authorized<ViewOrg>,
) -> AppResult<Json<Vec<MemberArrangements>>> {
    let employees = sqlx::query_as::<_, Employee>(
        "SELECT staff_id, staff_fname, staff_lname, dept, position, role, reporting_manager \
         FROM employees ORDER BY staff_id",
    )
    .fetch_all(&state.pool)
    .await?;

    let mut members = Vec::with_capacity(employees.len());
    for employee in employees {
        let arrangements = arrangements_for(&state.pool, employee.staff_id).await?;
        members.push(MemberArrangements { employee, arrangements });
    }

    Ok(Json(members))
}

#[utoipa::path(
    put,
    path = "/arrangements/{id}/withdraw",
    tag = "Arrangements",
    params(("id" = Uuid, Path, description = "Arrangement id")),
    responses(
        (status = 200, description = "Withdrawal recorded", body = Arrangement),
        (status = 404, description = "Not found or not owned by caller"),
        (status = 409, description = "Arrangement not in a withdrawable state")
    ),
    security(("bearerAuth" = []))
)]
pub async fn request_withdrawal(
    State(state): State<AppState>,
    auth: Authorized<ViewOwn>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Arrangement>> {
    let mut arrangement = fetch_arrangement(&state.pool, id).await?;
    if arrangement.staff_id != auth.employee.staff_id {
        // Don't reveal other employees' arrangement ids.
        return Err(AppError::not_found("Arrangement not found"));
    }

    let next = match arrangement.status.as_str() {
        // An approved arrangement needs the manager to sign off on the withdrawal.
        status::APPROVED => status::PENDING_WITHDRAWAL,
        // A pending one can be pulled back directly.
        status::PENDING => status::WITHDRAWN,
        _ => return Err(AppError::conflict("arrangement cannot be withdrawn in its current state")),
    };

    arrangement.status = next.to_string();
    arrangement.updated_at = utc_now();
    persist_status(&state.pool, &arrangement).await?;

    Ok(Json(arrangement))
}

async fn arrangements_for(pool: &SqlitePool, staff_id: i64) -> Result<Vec<Arrangement>, AppError> {
    let arrangements = sqlx::query_as::<_, Arrangement>(
        "SELECT id, staff_id, arrangement_date, slot, status, reason, remarks, created_at, updated_at \
         FROM arrangements WHERE staff_id = ? ORDER BY arrangement_date",
    )
    .bind(staff_id)
    .fetch_all(pool)
    .await?;

    Ok(arrangements)
}

/// Employees reporting to `manager_id`, each with their arrangements.
/// `exclude` keeps the caller (and the self-referential MD row) out of the view.
async fn member_arrangements_under(
    pool: &SqlitePool,
    manager_id: i64,
    exclude: i64,
) -> Result<Vec<MemberArrangements>, AppError> {
    let employees = sqlx::query_as::<_, Employee>(
        "SELECT staff_id, staff_fname, staff_lname, dept, position, role, reporting_manager \
         FROM employees WHERE reporting_manager = ? AND staff_id != ? ORDER BY staff_id",
    )
    .bind(manager_id)
    .bind(exclude)
    .fetch_all(pool)
    .await?;

    let mut members = Vec::with_capacity(employees.len());
    for employee in employees {
        let arrangements = arrangements_for(pool, employee.staff_id).await?;
        members.push(MemberArrangements { employee, arrangements });
    }

    Ok(members)
}

pub(crate) async fn fetch_arrangement(pool: &SqlitePool, id: Uuid) -> Result<Arrangement, AppError> {
    let arrangement = sqlx::query_as::<_, Arrangement>(
        "SELECT id, staff_id, arrangement_date, slot, status, reason, remarks, created_at, updated_at \
         FROM arrangements WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    arrangement.ok_or_else(|| AppError::not_found("Arrangement not found"))
}

pub(crate) async fn persist_status(pool: &SqlitePool, arrangement: &Arrangement) -> Result<(), AppError> {
    sqlx::query("UPDATE arrangements SET status = ?, remarks = ?, updated_at = ? WHERE id = ?")
        .bind(&arrangement.status)
        .bind(&arrangement.remarks)
        .bind(arrangement.updated_at)
        .bind(arrangement.id)
        .execute(pool)
        .await?;

    Ok(())
}
