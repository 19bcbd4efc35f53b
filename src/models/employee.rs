use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Organizational record from the employee directory.
///
/// `role` starts as the directory column but is overwritten with the
/// identity claim's role before any authorization decision; the claim is the
/// source of truth and the column is informational.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub staff_id: i64,
    pub staff_fname: String,
    pub staff_lname: String,
    pub dept: String,
    pub position: String,
    pub role: i64,
    pub reporting_manager: Option<i64>,
}

impl Employee {
    /// The MD sentinel: the root of the hierarchy reports to itself.
    pub fn is_top_of_hierarchy(&self) -> bool {
        self.reporting_manager == Some(self.staff_id)
    }
}
