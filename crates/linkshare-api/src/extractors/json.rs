//! JSON body extractor whose rejections use the error envelope.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `Json<T>` with malformed bodies reported as validation errors.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
