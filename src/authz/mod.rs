//! Authorization layer.
//!
//! Every protected endpoint is gated by the same chain: extract a credential
//! (per entry-point style), resolve the principal, load the employee record,
//! merge the claim role over the directory role, then run one pure predicate.
//! The chain is stateless and recomputed per request.
//!
//! Capabilities:
//! - `ViewOwn` - any authenticated employee
//! - `ViewOrg` - directors only
//! - `ViewTeam` - branches on manager/director vs staff; invalid roles denied
//! - `Approval` / `ApproveWithdrawal` - principals who manage at least one
//!   employee (their `staff_id` appears as someone's `reporting_manager`)

mod directory;
mod guard;
mod predicate;

pub use directory::{EmployeeDirectory, ManagerSet};
pub use guard::{Approval, ApproveWithdrawal, Authorized, Bearer, Capability, CredentialStyle, Session, ViewOrg, ViewOwn, ViewTeam};
pub use predicate::TeamGrant;

/// Role codes as stored in identity-provider metadata.
pub mod roles {
    pub const DIRECTOR: i64 = 1;
    pub const STAFF: i64 = 2;
    pub const MANAGER: i64 = 3;
}
