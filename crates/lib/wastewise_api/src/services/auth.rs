//! Authentication service: signup, login, logout and password flows over
//! `wastewise_core::auth`.

use tracing::{debug, info};
use wastewise_core::auth::AuthError;
use wastewise_core::auth::password::{
    hash_password_async, verify_credentials_async, verify_password_async,
};
use wastewise_core::auth::policy::{Operation, authorize};
use wastewise_core::models::{NewCitizen, Principal, Role};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{
    AreaManagerInfo, ChangePasswordRequest, CitizenAuthResponse, LoginRequest,
    ManagerLoginResponse, MessageResponse, SignupRequest, normalize_email, required,
};

/// Issue a token for `principal` and return it with its lifetime in seconds.
fn issue(state: &AppState, principal: &Principal) -> AppResult<(String, i64)> {
    let ttl = state.tokens.ttl_for(principal);
    let token = state.tokens.issue(principal, ttl)?;
    Ok((token, ttl.num_seconds()))
}

/// Register a citizen. Self-registered citizens always get the `user` role.
pub async fn signup(state: &AppState, req: SignupRequest) -> AppResult<CitizenAuthResponse> {
    let username = required(req.username, "username")?;
    let email = normalize_email(&required(req.email, "email")?);
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("password is required".into()))?;
    let area = req
        .area
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());

    let password_hash = hash_password_async(password).await?;
    let citizen = state
        .stores
        .principals
        .insert_citizen(NewCitizen {
            username,
            email,
            password_hash,
            role: Role::User,
            area,
        })
        .await?;

    info!(id = %citizen.id, "citizen registered");
    let (token, expires_in) = issue(state, &Principal::Citizen(citizen.clone()))?;
    Ok(CitizenAuthResponse::new(citizen, token, expires_in))
}

/// Citizen (and admin) login. Unknown email and wrong password are
/// indistinguishable.
pub async fn login(state: &AppState, req: LoginRequest) -> AppResult<CitizenAuthResponse> {
    let (email, password) = credentials(req.email, req.password)?;

    let found = state.stores.principals.find_citizen_by_email(&email).await?;
    let hash = found.as_ref().map(|c| c.password_hash.clone());
    let verified = verify_credentials_async(password, hash).await?;
    let creds = match found {
        Some(creds) if verified => creds,
        _ => {
            debug!("citizen login rejected");
            return Err(AuthError::CredentialError.into());
        }
    };

    let citizen = creds.principal;
    let (token, expires_in) = issue(state, &Principal::Citizen(citizen.clone()))?;
    Ok(CitizenAuthResponse::new(citizen, token, expires_in))
}

/// Area manager login. Same failure contract as [`login`].
pub async fn manager_login(
    state: &AppState,
    req: LoginRequest,
) -> AppResult<ManagerLoginResponse> {
    let (email, password) = credentials(req.email, req.password)?;

    let found = state.stores.principals.find_manager_by_email(&email).await?;
    let hash = found.as_ref().map(|c| c.password_hash.clone());
    let verified = verify_credentials_async(password, hash).await?;
    let creds = match found {
        Some(creds) if verified => creds,
        _ => {
            debug!("manager login rejected");
            return Err(AuthError::CredentialError.into());
        }
    };

    let manager = creds.principal;
    let (token, expires_in) = issue(state, &Principal::Manager(manager.clone()))?;
    Ok(ManagerLoginResponse {
        token,
        token_type: "Bearer".into(),
        expires_in,
        manager: AreaManagerInfo::from(manager),
    })
}

/// Missing login fields fail like bad credentials, so the response never
/// hints at which part was wrong.
fn credentials(email: Option<String>, password: Option<String>) -> AppResult<(String, String)> {
    match (email, password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            Ok((normalize_email(&email), password))
        }
        _ => Err(AuthError::CredentialError.into()),
    }
}

/// Revoke the presented token, if any, until its own expiry.
///
/// The token is not verified first: revoking an invalid token is harmless.
pub async fn logout(state: &AppState, token: Option<&str>) -> AppResult<MessageResponse> {
    if let Some(token) = token {
        state.revocations.revoke_for_logout(token).await?;
    }
    Ok(MessageResponse::new("Logged out successfully"))
}

/// Change the calling citizen's password after checking the current one.
pub async fn change_password(
    state: &AppState,
    principal: &Principal,
    req: ChangePasswordRequest,
) -> AppResult<MessageResponse> {
    authorize(principal, Operation::ChangeOwnPassword)?;
    let current = req
        .current_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("currentPassword is required".into()))?;
    let new = req
        .new_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("newPassword is required".into()))?;

    let id = principal.id();
    let creds = state
        .stores
        .principals
        .find_citizen(id)
        .await?
        .ok_or(AuthError::PrincipalNotFound)?;

    if !verify_password_async(current, creds.password_hash).await? {
        return Err(AppError::Validation("Current password is incorrect".into()));
    }

    let password_hash = hash_password_async(new).await?;
    if !state
        .stores
        .principals
        .set_citizen_password(id, &password_hash)
        .await?
    {
        return Err(AuthError::PrincipalNotFound.into());
    }

    info!(%id, "citizen password changed");
    Ok(MessageResponse::new("Password updated successfully"))
}
