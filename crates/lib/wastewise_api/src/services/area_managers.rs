//! Area manager administration.

use tracing::info;
use wastewise_core::auth::password::hash_password_async;
use wastewise_core::auth::policy::{Operation, authorize};
use wastewise_core::models::{AreaManagerUpdate, NewAreaManager, Principal};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{
    AreaManagerInfo, CreateAreaManagerRequest, MessageResponse, UpdateAreaManagerRequest,
    normalize_email, required,
};

fn not_found() -> AppError {
    AppError::NotFound("Area manager not found".into())
}

/// Trimmed, non-empty value or `None`.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn list(state: &AppState, principal: &Principal) -> AppResult<Vec<AreaManagerInfo>> {
    authorize(principal, Operation::ManageAreaManagers)?;
    let managers = state.stores.principals.list_managers().await?;
    Ok(managers.into_iter().map(AreaManagerInfo::from).collect())
}

pub async fn get(state: &AppState, principal: &Principal, nic: &str) -> AppResult<AreaManagerInfo> {
    authorize(principal, Operation::ManageAreaManagers)?;
    state
        .stores
        .principals
        .find_manager_by_nic(nic)
        .await?
        .map(AreaManagerInfo::from)
        .ok_or_else(not_found)
}

pub async fn create(
    state: &AppState,
    principal: &Principal,
    req: CreateAreaManagerRequest,
) -> AppResult<AreaManagerInfo> {
    authorize(principal, Operation::ManageAreaManagers)?;
    let nic = required(req.nic, "nic")?;
    let first_name = required(req.first_name, "firstName")?;
    let last_name = required(req.last_name, "lastName")?;
    let area = required(req.area, "area")?;
    let email = normalize_email(&required(req.email, "email")?);
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("password is required".into()))?;

    let password_hash = hash_password_async(password).await?;
    let manager = state
        .stores
        .principals
        .insert_manager(NewAreaManager {
            nic,
            first_name,
            last_name,
            area,
            email,
            password_hash,
        })
        .await?;

    info!(nic = %manager.nic, area = %manager.area, "area manager created");
    Ok(manager.into())
}

/// Partial update. A new password is re-hashed before it is stored.
pub async fn update(
    state: &AppState,
    principal: &Principal,
    nic: &str,
    req: UpdateAreaManagerRequest,
) -> AppResult<AreaManagerInfo> {
    authorize(principal, Operation::ManageAreaManagers)?;
    let password_hash = match req.password.filter(|p| !p.is_empty()) {
        Some(p) => Some(hash_password_async(p).await?),
        None => None,
    };
    let update = AreaManagerUpdate {
        first_name: present(req.first_name),
        last_name: present(req.last_name),
        area: present(req.area),
        email: present(req.email).map(|e| normalize_email(&e)),
        password_hash,
    };

    let manager = state
        .stores
        .principals
        .update_manager(nic, update)
        .await?
        .ok_or_else(not_found)?;

    info!(nic = %manager.nic, area = %manager.area, "area manager updated");
    Ok(manager.into())
}

pub async fn delete(state: &AppState, principal: &Principal, nic: &str) -> AppResult<MessageResponse> {
    authorize(principal, Operation::ManageAreaManagers)?;
    if !state.stores.principals.delete_manager(nic).await? {
        return Err(not_found());
    }
    info!(%nic, "area manager deleted");
    Ok(MessageResponse::new("Area manager deleted successfully"))
}
