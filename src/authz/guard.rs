use std::marker::PhantomData;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppState;
use crate::auth::Principal;
use crate::authz::directory::{EmployeeDirectory, ManagerSet};
use crate::authz::predicate::{self, TeamGrant};
use crate::errors::AppError;
use crate::models::employee::Employee;

/// Where the credential comes from, and how its absence maps to HTTP. The
/// two styles deliberately disagree (403 for bearer endpoints, 401 for
/// session endpoints); unifying them is a product decision we don't take.
pub trait CredentialStyle: Send + Sync + 'static {
    fn credential(parts: &Parts) -> Result<String, AppError>;
    fn invalid() -> AppError;
}

/// Token-style entry points: `Authorization: Bearer <token>`.
pub struct Bearer;

impl CredentialStyle for Bearer {
    fn credential(parts: &Parts) -> Result<String, AppError> {
        parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_owned)
            .ok_or_else(Self::invalid)
    }

    fn invalid() -> AppError {
        AppError::forbidden("Missing or invalid token")
    }
}

/// Session-style entry points: credential in the `session` cookie.
pub struct Session;

impl CredentialStyle for Session {
    fn credential(parts: &Parts) -> Result<String, AppError> {
        let jar = CookieJar::from_headers(&parts.headers);
        jar.get("session")
            .map(|cookie| cookie.value().to_owned())
            .ok_or_else(Self::invalid)
    }

    fn invalid() -> AppError {
        AppError::unauthorized("Unauthorized")
    }
}

/// A named capability: one predicate plus the capability-specific flags it
/// hands to the handler. Adding a capability means adding one impl here and
/// one predicate; the authenticate/lookup/merge steps are never duplicated.
#[async_trait]
pub trait Capability: Send + Sync + 'static {
    type Grant: Send + Sync;

    async fn authorize(employee: &Employee, directory: &EmployeeDirectory) -> Result<Self::Grant, AppError>;
}

/// View the entire organization's arrangements. Directors only.
pub struct ViewOrg;

#[async_trait]
impl Capability for ViewOrg {
    type Grant = ();

    async fn authorize(employee: &Employee, _directory: &EmployeeDirectory) -> Result<(), AppError> {
        predicate::can_view_org(employee)
    }
}

/// View one's own arrangements. Permissive once authenticated.
pub struct ViewOwn;

#[async_trait]
impl Capability for ViewOwn {
    type Grant = ();

    async fn authorize(employee: &Employee, _directory: &EmployeeDirectory) -> Result<(), AppError> {
        predicate::can_view_own(employee)
    }
}

/// View the team's arrangements; the grant tells the handler which branch
/// the caller is on.
pub struct ViewTeam;

#[async_trait]
impl Capability for ViewTeam {
    type Grant = TeamGrant;

    async fn authorize(employee: &Employee, _directory: &EmployeeDirectory) -> Result<TeamGrant, AppError> {
        predicate::team_grant(employee)
    }
}

/// Act on pending arrangement approvals. Requires managing at least one
/// employee; the grant carries the manager projection.
pub struct Approval;

#[async_trait]
impl Capability for Approval {
    type Grant = ManagerSet;

    async fn authorize(employee: &Employee, directory: &EmployeeDirectory) -> Result<ManagerSet, AppError> {
        let managers = directory.manager_set().await?;
        predicate::can_approve(employee.staff_id, &managers)?;
        Ok(managers)
    }
}

/// Act on pending withdrawal requests. Same rule as [`Approval`].
pub struct ApproveWithdrawal;

#[async_trait]
impl Capability for ApproveWithdrawal {
    type Grant = ManagerSet;

    async fn authorize(employee: &Employee, directory: &EmployeeDirectory) -> Result<ManagerSet, AppError> {
        Approval::authorize(employee, directory).await
    }
}

/// The authorization chain as an extractor:
/// credential -> principal -> employee -> role merge -> predicate.
/// Terminal on first failure; nothing persists across requests.
pub struct Authorized<C: Capability, S: CredentialStyle = Bearer> {
    pub principal: Principal,
    pub employee: Employee,
    pub grant: C::Grant,
    _style: PhantomData<S>,
}

#[async_trait]
impl<C, S> FromRequestParts<AppState> for Authorized<C, S>
where
    C: Capability,
    S: CredentialStyle,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credential = S::credential(parts)?;

        let principal = state
            .identity
            .resolve(&credential)
            .await
            .map_err(|err| {
                tracing::debug!(error = %err, "credential rejected");
                S::invalid()
            })?;

        let staff_id = principal
            .staff_id()
            .ok_or_else(|| AppError::bad_request("Missing staff_id claim"))?;

        let directory = EmployeeDirectory::new(state.pool.clone());
        let mut employee = directory.lookup(staff_id).await?;

        // The identity claim's role wins over the directory column.
        employee.role = principal.metadata.role;

        let grant = C::authorize(&employee, &directory).await?;

        Ok(Self {
            principal,
            employee,
            grant,
            _style: PhantomData,
        })
    }
}
