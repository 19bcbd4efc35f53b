use axum::extract::{Path, State};
use axum::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{Approval, ApproveWithdrawal, Authorized};
use crate::errors::{AppError, AppResult};
use crate::models::arrangement::{status, ApprovalDecisionRequest, Arrangement, WithdrawalDecisionRequest};
use crate::routes::arrangements::{fetch_arrangement, persist_status};
use crate::utils::utc_now;

#[utoipa::path(
    get,
    path = "/approvals",
    tag = "Approvals",
    responses(
        (status = 200, description = "Pending arrangements of direct reports", body = Vec<Arrangement>),
        (status = 403, description = "Caller manages nobody")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_pending(
    State(state): State<AppState>,
    auth: Authorized<Approval>,
) -> AppResult<Json<Vec<Arrangement>>> {
    let pending = pending_for_manager(&state.pool, auth.employee.staff_id, status::PENDING).await?;
    Ok(Json(pending))
}

#[utoipa::path(
    put,
    path = "/approvals/{id}",
    tag = "Approvals",
    params(("id" = Uuid, Path, description = "Arrangement id")),
    request_body = ApprovalDecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = Arrangement),
        (status = 404, description = "Not a pending request of a direct report"),
        (status = 409, description = "Arrangement is not pending")
    ),
    security(("bearerAuth" = []))
)]
pub async fn decide(
    State(state): State<AppState>,
    auth: Authorized<Approval>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalDecisionRequest>,
) -> AppResult<Json<Arrangement>> {
    let next = match payload.status.as_str() {
        status::APPROVED => status::APPROVED,
        status::REJECTED => status::REJECTED,
        _ => return Err(AppError::bad_request("status must be approved or rejected")),
    };

    let mut arrangement = owned_by_report(&state.pool, id, auth.employee.staff_id).await?;
    if arrangement.status != status::PENDING {
        return Err(AppError::conflict("arrangement is not pending"));
    }

    arrangement.status = next.to_string();
    arrangement.remarks = payload.remarks;
    arrangement.updated_at = utc_now();
    persist_status(&state.pool, &arrangement).await?;

    Ok(Json(arrangement))
}

#[utoipa::path(
    get,
    path = "/withdrawals",
    tag = "Approvals",
    responses(
        (status = 200, description = "Pending withdrawal requests of direct reports", body = Vec<Arrangement>),
        (status = 403, description = "Caller manages nobody")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_pending_withdrawals(
    State(state): State<AppState>,
    auth: Authorized<ApproveWithdrawal>,
) -> AppResult<Json<Vec<Arrangement>>> {
    let pending = pending_for_manager(&state.pool, auth.employee.staff_id, status::PENDING_WITHDRAWAL).await?;
    Ok(Json(pending))
}

#[utoipa::path(
    put,
    path = "/withdrawals/{id}",
    tag = "Approvals",
    params(("id" = Uuid, Path, description = "Arrangement id")),
    request_body = WithdrawalDecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = Arrangement),
        (status = 404, description = "Not a withdrawal request of a direct report"),
        (status = 409, description = "Arrangement is not pending withdrawal")
    ),
    security(("bearerAuth" = []))
)]
pub async fn decide_withdrawal(
    State(state): State<AppState>,
    auth: Authorized<ApproveWithdrawal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WithdrawalDecisionRequest>,
) -> AppResult<Json<Arrangement>> {
    let next = match payload.status.as_str() {
        // Withdrawal granted: the arrangement is gone.
        status::APPROVED => status::WITHDRAWN,
        // Withdrawal rejected: the arrangement stands.
        status::REJECTED => status::APPROVED,
        _ => return Err(AppError::bad_request("status must be approved or rejected")),
    };

    let mut arrangement = owned_by_report(&state.pool, id, auth.employee.staff_id).await?;
    if arrangement.status != status::PENDING_WITHDRAWAL {
        return Err(AppError::conflict("arrangement is not pending withdrawal"));
    }

    arrangement.status = next.to_string();
    arrangement.remarks = payload.remarks;
    arrangement.updated_at = utc_now();
    persist_status(&state.pool, &arrangement).await?;

    Ok(Json(arrangement))
}

async fn pending_for_manager(
    pool: &SqlitePool,
    manager_id: i64,
    wanted_status: &str,
) -> Result<Vec<Arrangement>, AppError> {
    let pending = sqlx::query_as::<_, Arrangement>(
        "SELECT a.id, a.staff_id, a.arrangement_date, a.slot, a.status, a.reason, a.remarks, a.created_at, a.updated_at \
         FROM arrangements a \
         JOIN employees e ON e.staff_id = a.staff_id \
         WHERE e.reporting_manager = ? AND a.staff_id != ? AND a.status = ? \
         ORDER BY a.arrangement_date",
    )
    .bind(manager_id)
    .bind(manager_id)
    .bind(wanted_status)
    .fetch_all(pool)
    .await?;

    Ok(pending)
}

/// The arrangement must belong to a direct report of `manager_id`; anything
/// else reads as not-found so approvers can't probe other teams' requests.
async fn owned_by_report(pool: &SqlitePool, id: Uuid, manager_id: i64) -> Result<Arrangement, AppError> {
    let arrangement = fetch_arrangement(pool, id).await?;

    let reporting_manager: Option<i64> =
        sqlx::query_scalar("SELECT reporting_manager FROM employees WHERE staff_id = ?")
            .bind(arrangement.staff_id)
            .fetch_optional(pool)
            .await?
            .flatten();

    if reporting_manager != Some(manager_id) || arrangement.staff_id == manager_id {
        return Err(AppError::not_found("Arrangement not found"));
    }

    Ok(arrangement)
}
