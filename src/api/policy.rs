//! Route-level access policy.
//!
//! Both layers run after [`super::auth::authentication_gate`] and only read
//! the [`Principal`] it left in the request extensions.

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::warn;

use super::ApiError;
use super::auth::Principal;

/// Rejects anonymous requests with 401.
pub async fn require_authenticated(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<Principal>().is_none() {
        return Err(ApiError::unauthorized());
    }
    Ok(next.run(request).await)
}

/// 401 when anonymous, 403 unless the principal holds `ROLE_ADMIN`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or_else(ApiError::unauthorized)?;

    if !principal.is_admin() {
        warn!(
            user_id = principal.id.value(),
            path = %request.uri().path(),
            "Non-admin denied access to admin route"
        );
        return Err(ApiError::forbidden());
    }

    Ok(next.run(request).await)
}
