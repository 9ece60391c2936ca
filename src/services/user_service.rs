//! Domain service for account administration.

use thiserror::Error;

use crate::domain::{Role, UserId};
use crate::models::user::User;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User with id {0} not found")]
    NotFound(UserId),

    #[error("You cannot disable your own account.")]
    SelfDisable,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    async fn get_user(&self, id: UserId) -> Result<User, UserError>;

    async fn change_role(&self, id: UserId, role: Role) -> Result<User, UserError>;

    /// Enables or disables `target`.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::SelfDisable`] when `actor` tries to disable
    /// itself. Nothing is written in that case.
    async fn set_enabled(
        &self,
        actor: UserId,
        target: UserId,
        enabled: bool,
    ) -> Result<User, UserError>;
}
