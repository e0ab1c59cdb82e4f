//! Domain models shared by the store, auth and API layers.
//!
//! These are internal domain models, distinct from the API request/response
//! models (which carry camelCase renames and omit credential material).

pub mod auth;
pub mod complaint;
pub mod principal;

pub use complaint::{
    AreaSummary, Complaint, ComplaintFilter, ComplaintStatus, GeoPoint, NewComplaint, Progress,
    ProgressCount, StatusCount,
};
pub use principal::{
    AreaManager, AreaManagerUpdate, Citizen, Credentials, NewAreaManager, NewCitizen, Principal,
    PrincipalKind, Role,
};
