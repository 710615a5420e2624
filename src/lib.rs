//! Authentication and authorization layer for an API gateway in front of a
//! commerce identity platform.
//!
//! - `services::auth`: bearer token → `VerifiedUserContext` (offline signature
//!   check or online who-am-I), plus role authorization
//! - `services::webhook`: HMAC signature check for inbound webhooks
//! - `middleware` / `api`: the axum glue that applies both to routes
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
