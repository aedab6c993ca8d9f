//! Liveness handler.

use axum::Json;

use crate::dto::response::{ApiResponse, PingResponse};

/// GET /ping
pub async fn ping() -> Json<ApiResponse<PingResponse>> {
    Json(ApiResponse::ok(PingResponse {
        ping: "pong".to_string(),
    }))
}
