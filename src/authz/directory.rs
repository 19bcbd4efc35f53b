use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::employee::Employee;

/// Read-only view over the `employees` table. Fetches fresh per request; no
/// caching, no retries, no write path.
#[derive(Debug, Clone)]
pub struct EmployeeDirectory {
    pool: SqlitePool,
}

impl EmployeeDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Single point lookup by staff id.
    pub async fn lookup(&self, staff_id: i64) -> Result<Employee, AppError> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT staff_id, staff_fname, staff_lname, dept, position, role, reporting_manager \
             FROM employees WHERE staff_id = ?",
        )
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;

        employee.ok_or_else(|| AppError::not_found("Employee not found"))
    }

    /// Distinct `reporting_manager` projection across the whole directory,
    /// used to test "does this principal manage anyone". A query failure here
    /// surfaces as the same 404 the employee lookup produces.
    pub async fn manager_set(&self) -> Result<ManagerSet, AppError> {
        let rows: Vec<i64> = sqlx::query_scalar(
            "SELECT DISTINCT reporting_manager FROM employees WHERE reporting_manager IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|_| AppError::not_found("Employee not found"))?;

        Ok(rows.into_iter().collect())
    }
}

/// The distinct set of `reporting_manager` values across all employees.
#[derive(Debug, Clone, Default)]
pub struct ManagerSet(HashSet<i64>);

impl ManagerSet {
    pub fn contains(&self, staff_id: i64) -> bool {
        self.0.contains(&staff_id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<i64> for ManagerSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
