//! Access policy for protected operations.
//!
//! Every rule lives in [`authorize`]; handlers never compare roles inline.
//! Complaint queries additionally get their server-side scope from
//! [`complaint_filter`], which is derived only from the resolved principal.

use std::fmt;

use thiserror::Error;

use crate::models::{ComplaintFilter, ComplaintStatus, Principal, Role};

/// Operations that require an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ViewOwnProfile,
    ChangeOwnPassword,
    SubmitComplaint,
    ListOwnComplaints,
    ListAreaComplaints,
    UpdateProgress,
    ManageAreaManagers,
    ListAllComplaints,
    ReviewComplaint,
    ViewAnalytics,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ViewOwnProfile => "view profile",
            Operation::ChangeOwnPassword => "change password",
            Operation::SubmitComplaint => "submit complaint",
            Operation::ListOwnComplaints => "list own complaints",
            Operation::ListAreaComplaints => "list area complaints",
            Operation::UpdateProgress => "update complaint progress",
            Operation::ManageAreaManagers => "manage area managers",
            Operation::ListAllComplaints => "list all complaints",
            Operation::ReviewComplaint => "review complaint",
            Operation::ViewAnalytics => "view analytics",
        };
        f.write_str(name)
    }
}

/// Policy denial.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Not permitted to {0}")]
    Forbidden(Operation),
}

/// Decide whether `principal` may perform `op`.
pub fn authorize(principal: &Principal, op: Operation) -> Result<(), PolicyError> {
    let role = principal.role();
    let allowed = match op {
        Operation::ViewOwnProfile
        | Operation::SubmitComplaint
        | Operation::ListOwnComplaints => true,
        Operation::ChangeOwnPassword => matches!(principal, Principal::Citizen(_)),
        Operation::ListAreaComplaints => role == Role::Manager,
        Operation::UpdateProgress => matches!(role, Role::Manager | Role::Admin),
        Operation::ManageAreaManagers
        | Operation::ListAllComplaints
        | Operation::ReviewComplaint
        | Operation::ViewAnalytics => role == Role::Admin,
    };
    if allowed {
        Ok(())
    } else {
        Err(PolicyError::Forbidden(op))
    }
}

/// Authorize a complaint listing and return the filter it must run with.
pub fn complaint_filter(
    principal: &Principal,
    op: Operation,
) -> Result<ComplaintFilter, PolicyError> {
    authorize(principal, op)?;
    match op {
        Operation::ListOwnComplaints => Ok(ComplaintFilter {
            email: Some(principal.email().to_string()),
            ..Default::default()
        }),
        Operation::ListAreaComplaints => Ok(ComplaintFilter {
            area: principal.area().map(str::to_string),
            status: Some(ComplaintStatus::Accepted),
            ..Default::default()
        }),
        Operation::ListAllComplaints => Ok(ComplaintFilter::default()),
        other => Err(PolicyError::Forbidden(other)),
    }
}

/// Authorize a progress update and return the area it is confined to.
///
/// Managers are confined to their own area; administrators are not.
pub fn progress_area(principal: &Principal) -> Result<Option<&str>, PolicyError> {
    authorize(principal, Operation::UpdateProgress)?;
    Ok(match principal {
        Principal::Manager(m) => Some(m.area.as_str()),
        Principal::Citizen(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::{AreaManager, Citizen};

    fn citizen(role: Role) -> Principal {
        Principal::Citizen(Citizen {
            id: Uuid::now_v7(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            role,
            area: Some("North".into()),
            created_at: Utc::now(),
        })
    }

    fn manager(area: &str) -> Principal {
        Principal::Manager(AreaManager {
            id: Uuid::now_v7(),
            nic: "N1".into(),
            first_name: "Nora".into(),
            last_name: "Reyes".into(),
            area: area.into(),
            email: "nora@city.gov".into(),
            created_at: Utc::now(),
        })
    }

    #[test]
    fn everyone_may_use_self_service_operations() {
        for p in [citizen(Role::User), citizen(Role::Admin), manager("North")] {
            for op in [
                Operation::ViewOwnProfile,
                Operation::SubmitComplaint,
                Operation::ListOwnComplaints,
            ] {
                assert!(authorize(&p, op).is_ok(), "{op} for {:?}", p.role());
            }
        }
    }

    #[test]
    fn admin_only_operations() {
        for op in [
            Operation::ManageAreaManagers,
            Operation::ListAllComplaints,
            Operation::ReviewComplaint,
            Operation::ViewAnalytics,
        ] {
            assert!(authorize(&citizen(Role::Admin), op).is_ok());
            assert_eq!(
                authorize(&citizen(Role::User), op),
                Err(PolicyError::Forbidden(op))
            );
            assert_eq!(
                authorize(&manager("North"), op),
                Err(PolicyError::Forbidden(op))
            );
        }
    }

    #[test]
    fn area_listing_is_manager_only() {
        assert!(authorize(&manager("North"), Operation::ListAreaComplaints).is_ok());
        assert!(authorize(&citizen(Role::Admin), Operation::ListAreaComplaints).is_err());
        assert!(authorize(&citizen(Role::User), Operation::ListAreaComplaints).is_err());
    }

    #[test]
    fn password_change_is_for_citizens() {
        assert!(authorize(&citizen(Role::User), Operation::ChangeOwnPassword).is_ok());
        assert!(authorize(&manager("North"), Operation::ChangeOwnPassword).is_err());
    }

    #[test]
    fn manager_area_filter_ignores_anything_but_the_record() {
        let filter = complaint_filter(&manager("North"), Operation::ListAreaComplaints).unwrap();
        assert_eq!(filter.area.as_deref(), Some("North"));
        assert_eq!(filter.status, Some(ComplaintStatus::Accepted));
        assert_eq!(filter.email, None);
    }

    #[test]
    fn own_filter_uses_principal_email() {
        let filter =
            complaint_filter(&citizen(Role::User), Operation::ListOwnComplaints).unwrap();
        assert_eq!(filter.email.as_deref(), Some("alice@example.com"));
        assert_eq!(filter.area, None);
    }

    #[test]
    fn non_listing_operation_has_no_filter() {
        assert!(complaint_filter(&citizen(Role::Admin), Operation::ViewAnalytics).is_err());
    }

    #[test]
    fn progress_scope() {
        assert_eq!(progress_area(&manager("North")).unwrap(), Some("North"));
        assert_eq!(progress_area(&citizen(Role::Admin)).unwrap(), None);
        assert!(progress_area(&citizen(Role::User)).is_err());
    }
}
