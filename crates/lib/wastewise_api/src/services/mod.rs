//! Request-independent business flows behind the handlers.

pub mod area_managers;
pub mod auth;
pub mod complaints;
