//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod courses;
pub mod error;
pub mod health;
pub mod results;
pub mod routes;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use crate::domain::ApiResult;
