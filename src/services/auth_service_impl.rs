//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::SecurityConfig;
use crate::db::{Store, is_unique_violation};
use crate::domain::Role;
use crate::models::user::{NewUser, User};
use crate::security::TokenService;
use crate::security::password::{hash_password_blocking, verify_password_blocking};
use crate::services::auth_service::{
    AuthError, AuthService, AuthToken, Registration, TokenIdentity,
};

pub struct SeaOrmAuthService {
    store: Store,
    tokens: Arc<TokenService>,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: Arc<TokenService>, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    fn issue_for(&self, user: &User) -> Result<AuthToken, AuthError> {
        let mut claims = Map::new();
        claims.insert("role".to_string(), Value::from(user.role.as_str()));
        let token = self.tokens.issue(&user.username, claims)?;
        Ok(AuthToken { token })
    }

    fn record_login(outcome: &'static str) {
        metrics::counter!("auth_logins_total", "outcome" => outcome).increment(1);
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<AuthToken, AuthError> {
        let users = self.store.user_repo();

        if users.exists_by_username(&registration.username).await? {
            return Err(AuthError::UsernameTaken(registration.username));
        }
        if users.exists_by_email(&registration.email).await? {
            return Err(AuthError::EmailTaken(registration.email));
        }

        let password_hash = hash_password_blocking(&registration.password, &self.security).await?;

        let username = registration.username.clone();
        let user = users
            .create(NewUser {
                username: registration.username,
                email: registration.email,
                firstname: registration.firstname,
                lastname: registration.lastname,
                password_hash,
                role: Role::User,
            })
            .await
            .map_err(|e| {
                // Lost a race with a concurrent registration.
                if is_unique_violation(&e) {
                    AuthError::UsernameTaken(username.clone())
                } else {
                    AuthError::from(e)
                }
            })?;

        info!(user_id = user.id.value(), username = %user.username, "User registered");
        self.issue_for(&user)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<AuthToken, AuthError> {
        let Some((user, password_hash)) = self.store.user_repo().get_credentials(username).await?
        else {
            Self::record_login("failure");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password_blocking(password, &password_hash).await? {
            Self::record_login("failure");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.enabled {
            debug!(username = %user.username, "Login refused for disabled account");
            Self::record_login("disabled");
            return Err(AuthError::InvalidCredentials);
        }

        Self::record_login("success");
        info!(user_id = user.id.value(), username = %user.username, "User logged in");
        self.issue_for(&user)
    }

    async fn resolve_token(&self, token: &str) -> Result<TokenIdentity, AuthError> {
        let subject = match self.tokens.extract_subject(token) {
            Ok(subject) => subject,
            Err(e) => {
                debug!(error = %e, "Ignoring unusable bearer token");
                return Ok(TokenIdentity::Anonymous);
            }
        };

        let Some(user) = self.store.user_repo().get_by_username(&subject).await? else {
            return Ok(TokenIdentity::Anonymous);
        };

        if !self.tokens.is_valid(token, &user.username) {
            return Ok(TokenIdentity::Anonymous);
        }

        if user.enabled {
            Ok(TokenIdentity::Authenticated(user))
        } else {
            Ok(TokenIdentity::Disabled(user))
        }
    }
}
