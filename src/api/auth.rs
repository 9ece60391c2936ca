use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, warn};

use super::observability::request_span;
use super::validation::{validate_email, validate_password, validate_username};
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::domain::{Role, UserId};
use crate::models::user::User;
use crate::services::{AuthError, AuthToken, Registration, TokenIdentity};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::UsernameTaken(_) | AuthError::EmailTaken(_) => {
                Self::Conflict(err.to_string())
            }
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Principal
// ============================================================================

/// Identity established by [`authentication_gate`] for the current request.
///
/// Extracting it from a handler rejects anonymous requests with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub fn authority(&self) -> String {
        self.role.authority()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// `Authorization: Bearer <token>`; any other scheme counts as absent.
fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn account_disabled() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(serde_json::json!({ "error": "User account is disabled" })),
    )
        .into_response()
}

/// Establishes the request [`Principal`] from a bearer token.
///
/// Unusable tokens leave the request anonymous; route-level policy decides
/// whether that is acceptable. The one hard stop is a valid token for a
/// disabled account, which is checked against the store on every request.
pub async fn authentication_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<Principal>().is_some() {
        return next.run(request).await;
    }

    let Some(token) = extract_bearer(request.headers()) else {
        return next.run(request).await;
    };

    match state.auth_service().resolve_token(&token).await {
        Ok(TokenIdentity::Authenticated(user)) => {
            request_span(request.extensions()).record("user_id", user.id.value());
            request.extensions_mut().insert(Principal::from(&user));
        }
        Ok(TokenIdentity::Disabled(user)) => {
            warn!(user_id = user.id.value(), username = %user.username, "Rejected request from disabled account");
            return account_disabled();
        }
        Ok(TokenIdentity::Anonymous) => {}
        Err(e) => {
            error!(error = %e, "Failed to resolve bearer token; continuing anonymously");
        }
    }

    next.run(request).await
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create a `USER` account and return a token for it
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthToken>>), ApiError> {
    let username = validate_username(&payload.username)?.to_string();
    let email = validate_email(&payload.email)?.to_string();
    validate_password(&payload.password)?;
    if payload.firstname.trim().is_empty() || payload.lastname.trim().is_empty() {
        return Err(ApiError::validation("First and last name are required"));
    }

    let token = state
        .auth_service()
        .register(Registration {
            firstname: payload.firstname.trim().to_string(),
            lastname: payload.lastname.trim().to_string(),
            username,
            email,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(token))))
}

/// POST /auth/authenticate
/// Exchange username and password for a token
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthToken>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let token = state
        .auth_service()
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(token)))
}

/// GET /auth/me
/// Current account, reloaded from the store
pub async fn me(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.user_service().get_user(principal.id).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")).as_deref(), Some("abc.def"));
        assert_eq!(extract_bearer(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer(&headers("Bearer ")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    #[test]
    fn principal_authority() {
        let principal = Principal {
            id: UserId::new(1),
            username: "admin".to_string(),
            role: Role::Admin,
        };
        assert_eq!(principal.authority(), "ROLE_ADMIN");
        assert!(principal.is_admin());
    }
}
