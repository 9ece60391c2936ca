use anyhow::Context;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::security::TokenService;
use crate::services::{
    AssetService, AuthService, SeaOrmAssetService, SeaOrmAuthService, SeaOrmUserService,
    UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub asset_service: Arc<dyn AssetService>,
}

impl SharedState {
    /// Connects the store, applies migrations and seeds the bootstrap admin.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        store
            .ensure_bootstrap_admin(&config.bootstrap, &config.security)
            .await
            .context("Failed to seed bootstrap admin")?;

        Self::with_store(config, store)
    }

    /// Wires the services around an already initialised store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let tokens = Arc::new(
            TokenService::from_base64_secret(
                &config.security.jwt_secret_or_random(),
                config.security.jwt_expiration_seconds,
            )
            .context("Invalid security.jwt_secret")?,
        );

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens,
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let user_service = Arc::new(SeaOrmUserService::new(store.clone())) as Arc<dyn UserService>;

        let asset_service =
            Arc::new(SeaOrmAssetService::new(store.clone())) as Arc<dyn AssetService>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            user_service,
            asset_service,
        })
    }
}
