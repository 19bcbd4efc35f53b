pub mod approvals;
pub mod arrangements;
pub mod auth;
pub mod health;
