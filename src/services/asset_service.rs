//! Domain service for the asset lifecycle.
//!
//! Creation, partial update, soft deletion, assignment, batch provisioning,
//! search and the dashboard aggregates. Every write takes the acting
//! username, which lands in the audit columns.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{AssetId, UserId};
use crate::models::asset::{
    Asset, AssetCriteria, AssetPatch, DashboardStats, NewAsset, Page, PageRequest,
};

/// Upper bound on a single batch request.
pub const MAX_BATCH_QUANTITY: u32 = 500;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset with id {0} not found")]
    NotFound(AssetId),

    #[error("User with id {0} not found")]
    UserNotFound(UserId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AssetError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AssetError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unique_violation(&err) {
            Self::Conflict("an asset with this serial number already exists".to_string())
        } else {
            Self::Internal(format!("{err:#}"))
        }
    }
}

/// Depreciated value of one asset on a given day.
#[derive(Debug, Clone, Serialize)]
pub struct AssetValuation {
    pub asset_id: AssetId,
    pub purchase_price: Decimal,
    pub residual_value: Decimal,
    pub useful_life_years: i32,
    pub years_used: i64,
    pub current_value: Decimal,
    pub as_of: NaiveDate,
}

#[async_trait::async_trait]
pub trait AssetService: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<Asset>, AssetError>;

    async fn search(
        &self,
        criteria: AssetCriteria,
        page: PageRequest,
    ) -> Result<Page<Asset>, AssetError>;

    async fn get(&self, id: AssetId) -> Result<Asset, AssetError>;

    async fn current_value(&self, id: AssetId) -> Result<AssetValuation, AssetError>;

    /// # Errors
    ///
    /// Returns [`AssetError::Validation`] when the price is not positive,
    /// the useful life is below one year or the residual value is negative.
    async fn create(&self, asset: NewAsset, actor: &str) -> Result<Asset, AssetError>;

    /// Overwrites the fields present in `patch`.
    async fn update(&self, id: AssetId, patch: AssetPatch, actor: &str)
    -> Result<Asset, AssetError>;

    /// Soft delete: the row stays with status `DISPOSED`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::NotFound`] for unknown and already disposed
    /// assets.
    async fn delete(&self, id: AssetId, actor: &str) -> Result<(), AssetError>;

    /// Assigns the asset and forces `ASSIGNED`, whatever the prior status.
    async fn assign(&self, id: AssetId, user_id: UserId, actor: &str)
    -> Result<Asset, AssetError>;

    /// Creates `quantity` hardware copies of `template`, with serials
    /// `{serial_prefix}001`, `{serial_prefix}002`, ... All or nothing.
    async fn create_batch_hardware(
        &self,
        template: NewAsset,
        quantity: u32,
        serial_prefix: &str,
        actor: &str,
    ) -> Result<Vec<Asset>, AssetError>;

    /// Creates `quantity` identical software copies sharing one license key.
    /// All or nothing.
    async fn create_batch_software(
        &self,
        template: NewAsset,
        quantity: u32,
        actor: &str,
    ) -> Result<Vec<Asset>, AssetError>;

    async fn dashboard_stats(&self) -> Result<DashboardStats, AssetError>;

    /// The five most recently created assets, newest first.
    async fn recent_assets(&self) -> Result<Vec<Asset>, AssetError>;
}
