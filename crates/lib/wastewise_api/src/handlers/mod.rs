//! Request handlers.

pub mod analytics;
pub mod area_managers;
pub mod complaints;
pub mod health;
pub mod users;
