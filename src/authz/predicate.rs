//! Pure permission predicates.
//!
//! Each predicate takes the claim-role-merged employee (plus whatever
//! projection its rule needs) and returns either a grant or the denial to
//! send back. Nothing here touches the database or request state.

use crate::authz::directory::ManagerSet;
use crate::authz::roles;
use crate::errors::AppError;
use crate::models::employee::Employee;

/// Extra flags handed to team-view handlers.
#[derive(Debug, Clone, Copy)]
pub struct TeamGrant {
    /// True for directors and managers; false for staff.
    pub manager_or_director: bool,
    /// True for the MD sentinel; the team view must then omit the
    /// reporting-manager's-team portion, since the MD has no superior.
    pub top_of_hierarchy: bool,
}

/// Directors only. Role-based, independent of whether they manage anyone.
pub fn can_view_org(employee: &Employee) -> Result<(), AppError> {
    if employee.role == roles::DIRECTOR {
        Ok(())
    } else {
        Err(AppError::forbidden("Insufficient permissions"))
    }
}

/// Any authenticated employee may view their own arrangements. The name
/// suggests an own-record restriction, but the deployed behavior is an
/// unconditional allow once authenticated, and we preserve that.
pub fn can_view_own(employee: &Employee) -> Result<(), AppError> {
    tracing::debug!(staff_id = employee.staff_id, role = employee.role, "view-own allowed");
    Ok(())
}

/// Roles 1 and 3 take the manager/director branch, role 2 the staff branch.
/// Anything else is denied outright rather than defaulting either way.
pub fn team_grant(employee: &Employee) -> Result<TeamGrant, AppError> {
    match employee.role {
        roles::DIRECTOR | roles::MANAGER => Ok(TeamGrant {
            manager_or_director: true,
            top_of_hierarchy: employee.is_top_of_hierarchy(),
        }),
        roles::STAFF => Ok(TeamGrant {
            manager_or_director: false,
            top_of_hierarchy: false,
        }),
        other => {
            tracing::debug!(staff_id = employee.staff_id, role = other, "team view denied: unknown role");
            Err(AppError::forbidden("Invalid role"))
        }
    }
}

/// A principal may act on approvals iff they manage at least one employee.
pub fn can_approve(staff_id: i64, managers: &ManagerSet) -> Result<(), AppError> {
    if managers.contains(staff_id) {
        Ok(())
    } else {
        tracing::debug!(staff_id, "approval denied: manages nobody");
        Err(AppError::forbidden("Insufficient permissions"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(role: i64, reporting_manager: Option<i64>) -> Employee {
        Employee {
            staff_id: 210001,
            staff_fname: "Rina".to_string(),
            staff_lname: "Tan".to_string(),
            dept: "Sales".to_string(),
            position: "Account Manager".to_string(),
            role,
            reporting_manager,
        }
    }

    #[test]
    fn view_org_allows_directors_only() {
        assert!(can_view_org(&employee(1, None)).is_ok());
        assert!(can_view_org(&employee(2, Some(1))).is_err());
        assert!(can_view_org(&employee(3, Some(1))).is_err());
    }

    #[test]
    fn view_org_ignores_manager_set() {
        // A director who manages nobody still passes; the rule is role-based.
        assert!(can_view_org(&employee(1, Some(999))).is_ok());
    }

    #[test]
    fn view_own_is_unconditional() {
        for role in [1, 2, 3, 0, 42] {
            assert!(can_view_own(&employee(role, None)).is_ok());
        }
    }

    #[test]
    fn team_grant_branches_on_role() {
        assert!(team_grant(&employee(1, Some(1))).unwrap().manager_or_director);
        assert!(team_grant(&employee(3, Some(5))).unwrap().manager_or_director);
        assert!(!team_grant(&employee(2, Some(5))).unwrap().manager_or_director);
    }

    #[test]
    fn team_grant_rejects_unknown_roles() {
        assert!(team_grant(&employee(0, None)).is_err());
        assert!(team_grant(&employee(4, None)).is_err());
        assert!(team_grant(&employee(-1, None)).is_err());
    }

    #[test]
    fn team_grant_flags_the_md() {
        let md = employee(3, Some(210001));
        let grant = team_grant(&md).unwrap();
        assert!(grant.manager_or_director);
        assert!(grant.top_of_hierarchy);

        let manager = employee(3, Some(110001));
        assert!(!team_grant(&manager).unwrap().top_of_hierarchy);
    }

    #[test]
    fn approve_requires_manager_set_membership() {
        let managers: ManagerSet = [110001, 210001].into_iter().collect();
        assert!(can_approve(210001, &managers).is_ok());
        assert!(can_approve(310001, &managers).is_err());
    }

    #[test]
    fn approve_denies_on_empty_manager_set() {
        let managers = ManagerSet::default();
        assert!(can_approve(210001, &managers).is_err());
    }
}
