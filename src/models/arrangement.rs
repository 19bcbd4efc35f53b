use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle states for a work arrangement request.
pub mod status {
    pub const PENDING: &str = "pending";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";
    pub const PENDING_WITHDRAWAL: &str = "pending_withdrawal";
    pub const WITHDRAWN: &str = "withdrawn";
}

/// Day slots an arrangement can cover.
pub mod slot {
    pub const AM: &str = "AM";
    pub const PM: &str = "PM";
    pub const FULL: &str = "FULL";

    pub fn is_valid(value: &str) -> bool {
        matches!(value, AM | PM | FULL)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Arrangement {
    pub id: Uuid,
    pub staff_id: i64,
    pub arrangement_date: NaiveDate,
    pub slot: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Approver's remarks, set when the request is decided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ArrangementCreateRequest {
    #[schema(example = "2026-09-14")]
    pub arrangement_date: NaiveDate,
    #[schema(example = "FULL")]
    pub slot: String,
    #[schema(example = "Focus day for quarterly report")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApprovalDecisionRequest {
    /// Either `approved` or `rejected`.
    #[schema(example = "approved")]
    pub status: String,
    #[schema(example = "Approved, keep Slack reachable")]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WithdrawalDecisionRequest {
    /// Either `approved` (arrangement becomes withdrawn) or `rejected`
    /// (arrangement stays approved).
    #[schema(example = "approved")]
    pub status: String,
    #[schema(example = "Noted, see you in the office")]
    pub remarks: Option<String>,
}
