use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors produced by the host itself. Module handlers answer with their own
/// problem documents.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m.as_str()),
        };
        tracing::debug!(status = status.as_u16(), %detail, "request rejected by host");
        (status, Json(ErrorBody { detail })).into_response()
    }
}
