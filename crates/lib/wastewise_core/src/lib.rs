//! # wastewise_core
//!
//! Core domain logic for WasteWise: principals and credentials, bearer token
//! issuance, the revocation registry, the authentication gate and the access
//! policy, plus the storage backends they run on.

pub mod auth;
pub mod models;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
