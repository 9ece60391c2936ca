use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{BootstrapConfig, SecurityConfig};
use crate::domain::Role;
use crate::models::user::NewUser;

pub mod migrator;
pub mod repositories;

pub use repositories::asset::AssetRepository;
pub use repositories::user::UserRepository;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn asset_repo(&self) -> AssetRepository {
        AssetRepository::new(self.conn.clone())
    }

    /// Seeds the configured administrator when no `ADMIN` account exists.
    /// Returns `true` when an account was created.
    pub async fn ensure_bootstrap_admin(
        &self,
        bootstrap: &BootstrapConfig,
        security: &SecurityConfig,
    ) -> Result<bool> {
        let users = self.user_repo();
        if users.count_by_role(Role::Admin).await? > 0 {
            return Ok(false);
        }

        if users.exists_by_username(&bootstrap.username).await? {
            warn!(
                username = %bootstrap.username,
                "No admin account exists and the bootstrap username is taken; skipping seed"
            );
            return Ok(false);
        }

        let password_hash =
            crate::security::password::hash_password_blocking(&bootstrap.password, security)
                .await?;

        users
            .create(NewUser {
                username: bootstrap.username.clone(),
                email: bootstrap.email.clone(),
                firstname: "Admin".to_string(),
                lastname: "User".to_string(),
                password_hash,
                role: Role::Admin,
            })
            .await?;

        warn!(
            username = %bootstrap.username,
            "Seeded default admin account. Rotate its password before exposing this instance"
        );
        Ok(true)
    }
}

/// True when the error chain contains a unique-constraint violation.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<DbErr>()
            .and_then(DbErr::sql_err)
            .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
    })
}
