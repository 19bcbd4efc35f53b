use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::employee::Employee;

/// Login credential row. `role` here mirrors what the identity provider
/// stores in user metadata and is what ends up in the token; it is the
/// authorization source of truth, not the directory's `role` column.
#[derive(Debug, Clone, FromRow)]
pub struct DbCredential {
    pub auth_id: Uuid,
    pub staff_id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "rina.tan@flexwork.example")]
    pub email: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub employee: Employee,
}
