//! # linkshare-api
//!
//! HTTP API layer for LinkShare built on Axum.
//!
//! Exposes registration, login, refresh and token verification endpoints,
//! the HTTP Basic client gate and the bearer access-token gate, the response
//! envelope, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
