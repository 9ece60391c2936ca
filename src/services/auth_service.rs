//! Domain service for authentication.
//!
//! Handles registration, credential login and resolving a bearer token to a
//! live account.

use serde::Serialize;
use thiserror::Error;

use crate::models::user::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately vague: never reveals whether the username exists.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("Email '{0}' is already registered")]
    EmailTaken(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<crate::security::TokenError> for AuthError {
    fn from(err: crate::security::TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthToken {
    pub token: String,
}

/// Outcome of resolving a bearer token against the credential store.
#[derive(Debug, Clone)]
pub enum TokenIdentity {
    /// Token missing, malformed, expired, foreign, or naming an unknown user.
    Anonymous,
    /// Token is valid but the account has been disabled.
    Disabled(User),
    Authenticated(User),
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a `USER` account and returns a token for it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UsernameTaken`] or [`AuthError::EmailTaken`] on
    /// duplicates.
    async fn register(&self, registration: Registration) -> Result<AuthToken, AuthError>;

    /// Verifies credentials and returns a token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for unknown users, wrong
    /// passwords and disabled accounts alike.
    async fn authenticate(&self, username: &str, password: &str) -> Result<AuthToken, AuthError>;

    /// Resolves a raw bearer token. The account is always reloaded from the
    /// store; token claims are never trusted for role or status.
    async fn resolve_token(&self, token: &str) -> Result<TokenIdentity, AuthError>;
}
