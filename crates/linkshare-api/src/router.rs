//! Route definitions for the LinkShare HTTP API.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router with every route and its gate.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes(&state))
        .merge(health_routes())
        .with_state(state)
}

/// Auth endpoints: register, login, refresh-token, verify-token
fn auth_routes(state: &AppState) -> Router<AppState> {
    let client_gated = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh-token", post(handlers::auth::refresh_token))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::client::require_basic_client,
        ));

    let token_gated = Router::new()
        .route("/auth/verify-token", get(handlers::auth::verify_token))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_access_token,
        ));

    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .merge(client_gated)
        .merge(token_gated)
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/ping", get(handlers::health::ping))
}
