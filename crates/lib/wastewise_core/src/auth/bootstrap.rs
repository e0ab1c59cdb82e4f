//! Administrator bootstrap.
//!
//! Administrators are citizens with the `admin` role. They cannot sign up
//! through the API, so the first one is created by the server at startup or
//! by the CLI.

use tracing::{info, warn};

use super::AuthError;
use super::password::hash_password_async;
use crate::models::{Citizen, NewCitizen, Role};
use crate::store::{PrincipalStore, StoreError};

/// Outcome of [`ensure_admin`].
#[derive(Debug, Clone, PartialEq)]
pub enum AdminStatus {
    Created(Citizen),
    /// A citizen with this email already exists and was left untouched.
    AlreadyExists(Citizen),
}

impl AdminStatus {
    pub fn citizen(&self) -> &Citizen {
        match self {
            AdminStatus::Created(c) | AdminStatus::AlreadyExists(c) => c,
        }
    }
}

/// Make sure an admin citizen with this email exists.
///
/// An existing account is never modified, whatever its role.
pub async fn ensure_admin(
    principals: &dyn PrincipalStore,
    username: &str,
    email: &str,
    password: &str,
) -> Result<AdminStatus, AuthError> {
    let email = email.trim().to_lowercase();
    let username = username.trim();
    if email.is_empty() || username.is_empty() || password.is_empty() {
        return Err(AuthError::ValidationError(
            "username, email and password are required".into(),
        ));
    }

    if let Some(existing) = principals.find_citizen_by_email(&email).await? {
        if existing.principal.role != Role::Admin {
            warn!(%email, "bootstrap admin email belongs to a non-admin citizen");
        }
        return Ok(AdminStatus::AlreadyExists(existing.principal));
    }

    let password_hash = hash_password_async(password.to_string()).await?;
    let created = principals
        .insert_citizen(NewCitizen {
            username: username.to_string(),
            email: email.clone(),
            password_hash,
            role: Role::Admin,
            area: None,
        })
        .await;

    match created {
        Ok(citizen) => {
            info!(%email, "admin account created");
            Ok(AdminStatus::Created(citizen))
        }
        // Lost a race with another bootstrap; report the winner.
        Err(StoreError::Conflict(_)) => principals
            .find_citizen_by_email(&email)
            .await?
            .map(|c| AdminStatus::AlreadyExists(c.principal))
            .ok_or_else(|| AuthError::Internal("admin vanished after conflict".into())),
        Err(e) => Err(e.into()),
    }
}
