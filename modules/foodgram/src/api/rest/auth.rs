use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, StatusCode},
};

use crate::api::rest::error::{from_parts, map_domain_error};
use crate::api::rest::problem::ProblemResponse;
use crate::contract::model::Principal;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// Resolves the `Authorization` header into the calling principal.
///
/// No header means an anonymous caller. A header that is present but
/// malformed, or names an unknown token, is rejected with 401 even on
/// endpoints that allow anonymous access.
///
/// ```ignore
/// async fn handler(CurrentPrincipal(viewer): CurrentPrincipal) { /* ... */ }
/// ```
pub struct CurrentPrincipal(pub Principal);

/// Accepts `Token <key>` and `Bearer <key>`; the scheme is case-insensitive.
pub fn parse_authorization(value: &HeaderValue) -> Option<&str> {
    let raw = value.to_str().ok()?.trim();
    let (scheme, key) = raw.split_once(' ')?;
    let key = key.trim();
    let scheme_ok =
        scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer");
    if !scheme_ok || key.is_empty() || key.contains(' ') {
        return None;
    }
    Some(key)
}

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Self(Principal::Anonymous));
        };
        let instance = parts.uri.path().to_owned();

        let key = parse_authorization(value)
            .ok_or_else(|| map_domain_error(&DomainError::Unauthorized, &instance))?
            .to_owned();

        let svc = parts.extensions.get::<Arc<Service>>().cloned().ok_or_else(|| {
            tracing::error!("foodgram service extension is missing");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "FOODGRAM_INTERNAL",
                "Internal error",
                "Service unavailable",
                &instance,
            )
        })?;

        svc.authenticate(&key)
            .await
            .map(Self)
            .map_err(|e| map_domain_error(&e, &instance))
    }
}
