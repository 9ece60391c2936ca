use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{Role, UserId};
use crate::entities::{prelude::*, users};
use crate::models::user::{NewUser, User};

impl TryFrom<users::Model> for User {
    type Error = anyhow::Error;

    fn try_from(model: users::Model) -> Result<Self> {
        let role = model
            .role
            .parse::<Role>()
            .with_context(|| format!("User {} has a corrupt role column", model.id))?;

        Ok(Self {
            id: UserId::new(model.id),
            username: model.username,
            email: model.email,
            firstname: model.firstname,
            lastname: model.lastname,
            role,
            enabled: model.enabled,
            created_at: model.created_at,
        })
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = Users::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        user.map(User::try_from).transpose()
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        user.map(User::try_from).transpose()
    }

    /// User plus stored password hash, for credential checks only.
    pub async fn get_credentials(&self, username: &str) -> Result<Option<(User, String)>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        user.map(|u| {
            let password_hash = u.password_hash.clone();
            User::try_from(u).map(|user| (user, password_hash))
        })
        .transpose()
    }

    pub async fn exists_by_username(&self, username: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("Failed to check username")?;
        Ok(count > 0)
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("Failed to check email")?;
        Ok(count > 0)
    }

    pub async fn count_by_role(&self, role: Role) -> Result<u64> {
        Users::find()
            .filter(users::Column::Role.eq(role.as_str()))
            .count(&self.conn)
            .await
            .context("Failed to count users by role")
    }

    pub async fn create(&self, user: NewUser) -> Result<User> {
        let now = super::now_timestamp();

        let active = users::ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            firstname: Set(user.firstname),
            lastname: Set(user.lastname),
            password_hash: Set(user.password_hash),
            role: Set(user.role.as_str().to_string()),
            enabled: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        User::try_from(model)
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        Users::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    /// Returns `None` when no user has this id.
    pub async fn update_role(&self, id: UserId, role: Role) -> Result<Option<User>> {
        let Some(model) = Users::find_by_id(id.value()).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = model.into();
        active.role = Set(role.as_str().to_string());
        active.updated_at = Set(super::now_timestamp());
        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user role")?;

        User::try_from(model).map(Some)
    }

    /// Returns `None` when no user has this id.
    pub async fn set_enabled(&self, id: UserId, enabled: bool) -> Result<Option<User>> {
        let Some(model) = Users::find_by_id(id.value()).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = model.into();
        active.enabled = Set(enabled);
        active.updated_at = Set(super::now_timestamp());
        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user status")?;

        User::try_from(model).map(Some)
    }
}
