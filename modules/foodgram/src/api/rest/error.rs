use axum::http::StatusCode;

use crate::api::rest::problem::{FieldError, Problem, ProblemResponse};
use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.foodgram.local/{}", code))
        .with_code(code)
        .with_instance(instance);
    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::NotFound { .. }
        | DomainError::RelationNotFound { .. }
        | DomainError::SubscriptionNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "FOODGRAM_NOT_FOUND",
            "Not found",
            e.to_string(),
            instance,
        ),
        DomainError::RelationExists { .. }
        | DomainError::AlreadySubscribed { .. }
        | DomainError::UserExists { .. } => from_parts(
            StatusCode::CONFLICT,
            "FOODGRAM_CONFLICT",
            "Conflict",
            e.to_string(),
            instance,
        ),
        DomainError::Validation { field, message } => {
            let mut resp = from_parts(
                StatusCode::BAD_REQUEST,
                "FOODGRAM_VALIDATION",
                "Validation error",
                e.to_string(),
                instance,
            );
            resp.0 = resp.0.with_errors(vec![FieldError {
                detail: message.clone(),
                pointer: format!("/{field}"),
            }]);
            resp
        }
        DomainError::SelfSubscription => from_parts(
            StatusCode::BAD_REQUEST,
            "FOODGRAM_SELF_SUBSCRIPTION",
            "Self subscription",
            e.to_string(),
            instance,
        ),
        DomainError::EmptyCart => from_parts(
            StatusCode::BAD_REQUEST,
            "FOODGRAM_EMPTY_CART",
            "Empty shopping cart",
            e.to_string(),
            instance,
        ),
        DomainError::Unauthorized => from_parts(
            StatusCode::UNAUTHORIZED,
            "FOODGRAM_UNAUTHORIZED",
            "Unauthorized",
            e.to_string(),
            instance,
        ),
        DomainError::Forbidden => from_parts(
            StatusCode::FORBIDDEN,
            "FOODGRAM_FORBIDDEN",
            "Forbidden",
            e.to_string(),
            instance,
        ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "FOODGRAM_INTERNAL",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    }
}
