//! Axum middleware stack.

pub mod auth;
pub mod client;
pub mod logging;
