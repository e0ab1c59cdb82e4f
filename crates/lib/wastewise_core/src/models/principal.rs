//! Principal domain models.
//!
//! A principal is anything that can log in: a citizen (who may also hold the
//! `admin` role) or an area manager. Both variants share the same capability
//! shape so the authentication gate resolves them through one code path.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role tag carried by every principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Self-registered citizen.
    User,
    /// Municipal administrator.
    Admin,
    /// Area manager, scoped to a single area.
    Manager,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Manager => "manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Which collection a principal lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    Citizen,
    Manager,
}

impl PrincipalKind {
    /// Managers are the only principals carrying the `manager` role.
    pub fn from_role(role: Role) -> Self {
        match role {
            Role::Manager => PrincipalKind::Manager,
            Role::User | Role::Admin => PrincipalKind::Citizen,
        }
    }
}

/// Citizen account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citizen {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// `user` or `admin`.
    pub role: Role,
    pub area: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Area manager account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaManager {
    pub id: Uuid,
    /// National identity card number.
    pub nic: String,
    pub first_name: String,
    pub last_name: String,
    pub area: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A principal together with its bcrypt hash, for credential checks only.
#[derive(Debug, Clone)]
pub struct Credentials<T> {
    pub principal: T,
    pub password_hash: String,
}

/// Any authenticated principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
    Citizen(Citizen),
    Manager(AreaManager),
}

impl Principal {
    pub fn id(&self) -> Uuid {
        match self {
            Principal::Citizen(c) => c.id,
            Principal::Manager(m) => m.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Principal::Citizen(c) => &c.email,
            Principal::Manager(m) => &m.email,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::Citizen(c) => c.role,
            Principal::Manager(_) => Role::Manager,
        }
    }

    pub fn area(&self) -> Option<&str> {
        match self {
            Principal::Citizen(c) => c.area.as_deref(),
            Principal::Manager(m) => Some(&m.area),
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::Citizen(_) => PrincipalKind::Citizen,
            Principal::Manager(_) => PrincipalKind::Manager,
        }
    }

    /// Name recorded on complaints filed by this principal.
    pub fn display_name(&self) -> String {
        match self {
            Principal::Citizen(c) => c.username.clone(),
            Principal::Manager(m) => format!("{} {}", m.first_name, m.last_name),
        }
    }
}

impl From<Citizen> for Principal {
    fn from(c: Citizen) -> Self {
        Principal::Citizen(c)
    }
}

impl From<AreaManager> for Principal {
    fn from(m: AreaManager) -> Self {
        Principal::Manager(m)
    }
}

/// Insert payload for a citizen. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewCitizen {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub area: Option<String>,
}

/// Insert payload for an area manager. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAreaManager {
    pub nic: String,
    pub first_name: String,
    pub last_name: String,
    pub area: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update of an area manager. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AreaManagerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub area: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl AreaManagerUpdate {
    /// Apply the update in place.
    pub fn apply(self, manager: &mut Credentials<AreaManager>) {
        let m = &mut manager.principal;
        if let Some(v) = self.first_name {
            m.first_name = v;
        }
        if let Some(v) = self.last_name {
            m.last_name = v;
        }
        if let Some(v) = self.area {
            m.area = v;
        }
        if let Some(v) = self.email {
            m.email = v;
        }
        if let Some(v) = self.password_hash {
            manager.password_hash = v;
        }
    }
}
