//! `SeaORM` implementation of the `AssetService` trait.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::db::Store;
use crate::domain::{AssetId, AssetKind, UserId};
use crate::models::asset::{
    Asset, AssetCriteria, AssetDetails, AssetPatch, DashboardStats, NewAsset, Page, PageRequest,
};
use crate::services::asset_service::{
    AssetError, AssetService, AssetValuation, MAX_BATCH_QUANTITY,
};
use crate::valuation::{current_value_of, whole_years_between};

pub struct SeaOrmAssetService {
    store: Store,
}

impl SeaOrmAssetService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn record_created(kind: AssetKind, count: usize) {
        metrics::counter!("assets_created_total", "kind" => kind.as_str())
            .increment(count as u64);
    }
}

fn check_price(price: Decimal) -> Result<(), AssetError> {
    if price <= Decimal::ZERO {
        return Err(AssetError::Validation(
            "purchase_price must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn check_life(years: i32) -> Result<(), AssetError> {
    if years < 1 {
        return Err(AssetError::Validation(
            "useful_life_years must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn check_residual(residual: Decimal) -> Result<(), AssetError> {
    if residual < Decimal::ZERO {
        return Err(AssetError::Validation(
            "residual_value cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), AssetError> {
    if name.trim().is_empty() {
        return Err(AssetError::Validation("name cannot be empty".to_string()));
    }
    Ok(())
}

fn check_new_asset(asset: &NewAsset) -> Result<(), AssetError> {
    check_name(&asset.name)?;
    check_price(asset.purchase_price)?;
    check_life(asset.useful_life_years)?;
    check_residual(asset.residual_value)?;
    if asset.residual_value > asset.purchase_price {
        warn!(
            name = %asset.name,
            "residual_value exceeds purchase_price; asset will never depreciate"
        );
    }
    Ok(())
}

fn check_patch(patch: &AssetPatch) -> Result<(), AssetError> {
    if let Some(name) = &patch.name {
        check_name(name)?;
    }
    if let Some(price) = patch.purchase_price {
        check_price(price)?;
    }
    if let Some(life) = patch.useful_life_years {
        check_life(life)?;
    }
    if let Some(residual) = patch.residual_value {
        check_residual(residual)?;
    }
    Ok(())
}

fn check_quantity(quantity: u32) -> Result<(), AssetError> {
    if quantity == 0 || quantity > MAX_BATCH_QUANTITY {
        return Err(AssetError::Validation(format!(
            "quantity must be between 1 and {MAX_BATCH_QUANTITY}"
        )));
    }
    Ok(())
}

/// `prefix` followed by the 1-based sequence, zero-padded to three digits.
#[must_use]
pub fn batch_serial(prefix: &str, sequence: u32) -> String {
    format!("{prefix}{sequence:03}")
}

/// Copies of a hardware template with generated serial numbers.
fn expand_hardware(
    template: &NewAsset,
    quantity: u32,
    serial_prefix: &str,
) -> Result<Vec<NewAsset>, AssetError> {
    let AssetDetails::Hardware(hardware) = &template.details else {
        return Err(AssetError::Validation(
            "batch hardware template must be a hardware asset".to_string(),
        ));
    };

    Ok((1..=quantity)
        .map(|sequence| {
            let mut details = hardware.clone();
            details.serial_number = Some(batch_serial(serial_prefix, sequence));
            NewAsset {
                details: AssetDetails::Hardware(details),
                ..template.clone()
            }
        })
        .collect())
}

#[async_trait]
impl AssetService for SeaOrmAssetService {
    async fn list(&self, page: PageRequest) -> Result<Page<Asset>, AssetError> {
        Ok(self.store.asset_repo().find_all(page).await?)
    }

    async fn search(
        &self,
        criteria: AssetCriteria,
        page: PageRequest,
    ) -> Result<Page<Asset>, AssetError> {
        Ok(self.store.asset_repo().search(&criteria, page).await?)
    }

    async fn get(&self, id: AssetId) -> Result<Asset, AssetError> {
        self.store
            .asset_repo()
            .find_by_id(id)
            .await?
            .ok_or(AssetError::NotFound(id))
    }

    async fn current_value(&self, id: AssetId) -> Result<AssetValuation, AssetError> {
        let asset = self.get(id).await?;
        let today = Self::today();

        Ok(AssetValuation {
            asset_id: asset.id,
            purchase_price: asset.purchase_price,
            residual_value: asset.residual_value,
            useful_life_years: asset.useful_life_years,
            years_used: whole_years_between(asset.purchase_date, today),
            current_value: current_value_of(&asset, today),
            as_of: today,
        })
    }

    async fn create(&self, asset: NewAsset, actor: &str) -> Result<Asset, AssetError> {
        check_new_asset(&asset)?;

        let kind = asset.details.kind();
        let created = self.store.asset_repo().create(asset, actor).await?;

        Self::record_created(kind, 1);
        info!(asset_id = created.id.value(), kind = %kind, actor, "Asset created");
        Ok(created)
    }

    async fn update(
        &self,
        id: AssetId,
        patch: AssetPatch,
        actor: &str,
    ) -> Result<Asset, AssetError> {
        check_patch(&patch)?;

        let updated = self
            .store
            .asset_repo()
            .update(id, patch, actor)
            .await?
            .ok_or(AssetError::NotFound(id))?;

        info!(asset_id = id.value(), actor, "Asset updated");
        Ok(updated)
    }

    async fn delete(&self, id: AssetId, actor: &str) -> Result<(), AssetError> {
        if !self.store.asset_repo().soft_delete(id, actor).await? {
            return Err(AssetError::NotFound(id));
        }

        info!(asset_id = id.value(), actor, "Asset disposed");
        Ok(())
    }

    async fn assign(
        &self,
        id: AssetId,
        user_id: UserId,
        actor: &str,
    ) -> Result<Asset, AssetError> {
        let assets = self.store.asset_repo();
        if !assets.exists_by_id(id).await? {
            return Err(AssetError::NotFound(id));
        }

        if self.store.user_repo().get_by_id(user_id).await?.is_none() {
            return Err(AssetError::UserNotFound(user_id));
        }

        let assigned = assets
            .assign(id, user_id, actor)
            .await?
            .ok_or(AssetError::NotFound(id))?;

        info!(
            asset_id = id.value(),
            user_id = user_id.value(),
            actor,
            "Asset assigned"
        );
        Ok(assigned)
    }

    async fn create_batch_hardware(
        &self,
        template: NewAsset,
        quantity: u32,
        serial_prefix: &str,
        actor: &str,
    ) -> Result<Vec<Asset>, AssetError> {
        check_quantity(quantity)?;
        if serial_prefix.trim().is_empty() {
            return Err(AssetError::Validation(
                "serial_prefix cannot be empty".to_string(),
            ));
        }
        check_new_asset(&template)?;

        let batch = expand_hardware(&template, quantity, serial_prefix)?;
        let created = self
            .store
            .asset_repo()
            .create_batch(batch, actor)
            .await
            .map_err(|e| {
                warn!(error = %format!("{e:#}"), serial_prefix, quantity, "Hardware batch rolled back");
                AssetError::from(e)
            })?;

        Self::record_created(AssetKind::Hardware, created.len());
        info!(count = created.len(), serial_prefix, actor, "Hardware batch created");
        Ok(created)
    }

    async fn create_batch_software(
        &self,
        template: NewAsset,
        quantity: u32,
        actor: &str,
    ) -> Result<Vec<Asset>, AssetError> {
        check_quantity(quantity)?;
        if template.details.kind() != AssetKind::Software {
            return Err(AssetError::Validation(
                "batch software template must be a software asset".to_string(),
            ));
        }
        check_new_asset(&template)?;

        let batch = vec![template; quantity as usize];
        let created = self
            .store
            .asset_repo()
            .create_batch(batch, actor)
            .await
            .map_err(|e| {
                warn!(error = %format!("{e:#}"), quantity, "Software batch rolled back");
                AssetError::from(e)
            })?;

        Self::record_created(AssetKind::Software, created.len());
        info!(count = created.len(), actor, "Software batch created");
        Ok(created)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, AssetError> {
        Ok(self.store.asset_repo().dashboard_stats(Self::today()).await?)
    }

    async fn recent_assets(&self) -> Result<Vec<Asset>, AssetError> {
        Ok(self.store.asset_repo().recent().await?)
    }
}
