//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::domain::{Role, UserId};
use crate::models::user::User;
use crate::services::user_service::{UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        Ok(self.store.user_repo().list_all().await?)
    }

    async fn get_user(&self, id: UserId) -> Result<User, UserError> {
        self.store
            .user_repo()
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    async fn change_role(&self, id: UserId, role: Role) -> Result<User, UserError> {
        let user = self
            .store
            .user_repo()
            .update_role(id, role)
            .await?
            .ok_or(UserError::NotFound(id))?;

        info!(user_id = id.value(), role = %role, "User role changed");
        Ok(user)
    }

    async fn set_enabled(
        &self,
        actor: UserId,
        target: UserId,
        enabled: bool,
    ) -> Result<User, UserError> {
        if !enabled && actor == target {
            return Err(UserError::SelfDisable);
        }

        let user = self
            .store
            .user_repo()
            .set_enabled(target, enabled)
            .await?
            .ok_or(UserError::NotFound(target))?;

        info!(user_id = target.value(), enabled, "User status changed");
        Ok(user)
    }
}
