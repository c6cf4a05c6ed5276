use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use rahhal_common::AppError;

use crate::jwt::{Claims, JwtService};

/// Extractor for authenticated handlers: pulls the bearer token from the
/// Authorization header and validates it against the shared [`JwtService`].
/// Handlers declare `claims: Claims` in their signature; unauthenticated
/// requests are rejected before the handler body runs.
#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    JwtService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jwt_service = JwtService::from_ref(state);
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Authentication("User must be authenticated".to_string()))?;
        jwt_service.validate_token(&token)
    }
}

/// Extract JWT token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization")?;
    let auth_str = auth_header.to_str().ok()?;
    auth_str.strip_prefix("Bearer ").map(|t| t.to_string())
}
