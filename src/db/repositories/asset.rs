use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::asset_search::{criteria_condition, not_disposed, sort_column, sort_order};
use crate::domain::{AssetId, AssetKind, AssetStatus, UserId};
use crate::entities::{assets, prelude::*, users};
use crate::models::asset::{
    Asset, AssetCriteria, AssetDetails, AssetPatch, AssignedUser, DashboardStats,
    HardwareDetails, NewAsset, Page, PageRequest, SoftwareDetails,
};

const RECENT_LIMIT: u64 = 5;

fn parse_decimal(raw: &str, field: &str, id: i32) -> Result<Decimal> {
    Decimal::from_str(raw).with_context(|| format!("Asset {id} has a corrupt {field} column"))
}

fn to_asset(model: assets::Model, assignee: Option<users::Model>) -> Result<Asset> {
    let id = model.id;
    let kind = AssetKind::from_str(&model.kind)
        .with_context(|| format!("Asset {id} has a corrupt kind column"))?;
    let status = AssetStatus::from_str(&model.status)
        .with_context(|| format!("Asset {id} has a corrupt status column"))?;

    let details = match kind {
        AssetKind::Hardware => AssetDetails::Hardware(HardwareDetails {
            serial_number: model.serial_number,
            warranty_end_date: model.warranty_end_date,
            location: model.location,
            last_maintenance_date: model.last_maintenance_date,
            maintenance_interval_months: model.maintenance_interval_months,
        }),
        AssetKind::Software => AssetDetails::Software(SoftwareDetails {
            license_key: model.license_key,
            expiry_date: model.expiry_date,
        }),
    };

    Ok(Asset {
        id: AssetId::new(id),
        name: model.name,
        purchase_price: parse_decimal(&model.purchase_price, "purchase_price", id)?,
        purchase_date: model.purchase_date,
        status,
        residual_value: parse_decimal(&model.residual_value, "residual_value", id)?,
        useful_life_years: model.useful_life_years,
        assigned_to: assignee.map(|u| AssignedUser {
            id: UserId::new(u.id),
            username: u.username,
        }),
        details,
        created_by: model.created_by,
        created_at: model.created_at,
        last_modified_by: model.last_modified_by,
        last_modified_at: model.last_modified_at,
    })
}

fn new_active_model(asset: NewAsset, actor: &str, now: &str) -> assets::ActiveModel {
    let mut active = assets::ActiveModel {
        kind: Set(asset.details.kind().as_str().to_string()),
        name: Set(asset.name),
        purchase_price: Set(asset.purchase_price.to_string()),
        purchase_date: Set(asset.purchase_date),
        status: Set(asset.status.as_str().to_string()),
        residual_value: Set(asset.residual_value.to_string()),
        useful_life_years: Set(asset.useful_life_years),
        assigned_to_id: Set(None),
        serial_number: Set(None),
        warranty_end_date: Set(None),
        location: Set(None),
        last_maintenance_date: Set(None),
        maintenance_interval_months: Set(None),
        license_key: Set(None),
        expiry_date: Set(None),
        created_by: Set(Some(actor.to_string())),
        created_at: Set(now.to_string()),
        last_modified_by: Set(Some(actor.to_string())),
        last_modified_at: Set(now.to_string()),
        ..Default::default()
    };

    match asset.details {
        AssetDetails::Hardware(hw) => {
            active.serial_number = Set(hw.serial_number);
            active.warranty_end_date = Set(hw.warranty_end_date);
            active.location = Set(hw.location);
            active.last_maintenance_date = Set(hw.last_maintenance_date);
            active.maintenance_interval_months = Set(hw.maintenance_interval_months);
        }
        AssetDetails::Software(sw) => {
            active.license_key = Set(sw.license_key);
            active.expiry_date = Set(sw.expiry_date);
        }
    }

    active
}

fn touch(active: &mut assets::ActiveModel, actor: &str) {
    active.last_modified_by = Set(Some(actor.to_string()));
    active.last_modified_at = Set(super::now_timestamp());
}

pub struct AssetRepository {
    conn: DatabaseConnection,
}

impl AssetRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Visible (non-disposed) row by id.
    async fn find_model<C: ConnectionTrait>(conn: &C, id: AssetId) -> Result<Option<assets::Model>> {
        Assets::find_by_id(id.value())
            .filter(not_disposed())
            .one(conn)
            .await
            .context("Failed to query asset by ID")
    }

    async fn load<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Asset> {
        let (model, assignee) = Assets::find_by_id(id)
            .find_also_related(Users)
            .one(conn)
            .await
            .context("Failed to load asset")?
            .ok_or_else(|| anyhow::anyhow!("Asset {id} vanished after write"))?;

        to_asset(model, assignee)
    }

    pub async fn find_by_id(&self, id: AssetId) -> Result<Option<Asset>> {
        Assets::find_by_id(id.value())
            .filter(not_disposed())
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query asset by ID")?
            .map(|(model, assignee)| to_asset(model, assignee))
            .transpose()
    }

    pub async fn exists_by_id(&self, id: AssetId) -> Result<bool> {
        let count = Assets::find_by_id(id.value())
            .filter(not_disposed())
            .count(&self.conn)
            .await
            .context("Failed to check asset existence")?;
        Ok(count > 0)
    }

    /// Paged listing of non-disposed assets.
    pub async fn find_all(&self, page: PageRequest) -> Result<Page<Asset>> {
        self.search(&AssetCriteria::default(), page).await
    }

    pub async fn search(&self, criteria: &AssetCriteria, page: PageRequest) -> Result<Page<Asset>> {
        let query = Assets::find()
            .find_also_related(Users)
            .filter(criteria_condition(criteria))
            .order_by(sort_column(page.sort_by), sort_order(page.order))
            .order_by_asc(assets::Column::Id);

        let paginator = query.paginate(&self.conn, page.size);
        let totals = paginator
            .num_items_and_pages()
            .await
            .context("Failed to count assets")?;
        let rows = paginator
            .fetch_page(page.page)
            .await
            .context("Failed to fetch asset page")?;

        let content = rows
            .into_iter()
            .map(|(model, assignee)| to_asset(model, assignee))
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            content,
            page: page.page,
            size: page.size,
            total_elements: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    pub async fn recent(&self) -> Result<Vec<Asset>> {
        Assets::find()
            .find_also_related(Users)
            .filter(not_disposed())
            .order_by_desc(assets::Column::CreatedAt)
            .order_by_desc(assets::Column::Id)
            .limit(RECENT_LIMIT)
            .all(&self.conn)
            .await
            .context("Failed to query recent assets")?
            .into_iter()
            .map(|(model, assignee)| to_asset(model, assignee))
            .collect()
    }

    pub async fn create(&self, asset: NewAsset, actor: &str) -> Result<Asset> {
        let now = super::now_timestamp();
        let model = new_active_model(asset, actor, &now)
            .insert(&self.conn)
            .await
            .context("Failed to insert asset")?;

        to_asset(model, None)
    }

    /// Inserts every asset in one transaction; any failure rolls back the
    /// whole batch.
    pub async fn create_batch(&self, batch: Vec<NewAsset>, actor: &str) -> Result<Vec<Asset>> {
        let now = super::now_timestamp();
        let txn = self.conn.begin().await?;

        let mut created = Vec::with_capacity(batch.len());
        for (index, asset) in batch.into_iter().enumerate() {
            let model = new_active_model(asset, actor, &now)
                .insert(&txn)
                .await
                .with_context(|| format!("Failed to insert batch item {}", index + 1))?;
            created.push(to_asset(model, None)?);
        }

        txn.commit().await?;
        Ok(created)
    }

    /// Returns `None` when the asset is absent or disposed.
    pub async fn update(&self, id: AssetId, patch: AssetPatch, actor: &str) -> Result<Option<Asset>> {
        let Some(model) = Self::find_model(&self.conn, id).await? else {
            return Ok(None);
        };

        let mut active: assets::ActiveModel = model.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(price) = patch.purchase_price {
            active.purchase_price = Set(price.to_string());
        }
        if let Some(date) = patch.purchase_date {
            active.purchase_date = Set(date);
        }
        if let Some(life) = patch.useful_life_years {
            active.useful_life_years = Set(life);
        }
        if let Some(residual) = patch.residual_value {
            active.residual_value = Set(residual.to_string());
        }
        if let Some(status) = patch.status {
            active.status = Set(status.as_str().to_string());
        }
        touch(&mut active, actor);

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update asset")?;

        Self::load(&self.conn, model.id).await.map(Some)
    }

    /// Marks the asset `DISPOSED`. Returns `false` when it was absent or
    /// already disposed.
    pub async fn soft_delete(&self, id: AssetId, actor: &str) -> Result<bool> {
        let Some(model) = Self::find_model(&self.conn, id).await? else {
            return Ok(false);
        };

        let mut active: assets::ActiveModel = model.into();
        active.status = Set(AssetStatus::Disposed.as_str().to_string());
        touch(&mut active, actor);
        active
            .update(&self.conn)
            .await
            .context("Failed to dispose asset")?;

        Ok(true)
    }

    /// Sets the assignee and forces `ASSIGNED`. The caller checks that the
    /// user exists.
    pub async fn assign(&self, id: AssetId, user_id: UserId, actor: &str) -> Result<Option<Asset>> {
        let Some(model) = Self::find_model(&self.conn, id).await? else {
            return Ok(None);
        };

        let mut active: assets::ActiveModel = model.into();
        active.assigned_to_id = Set(Some(user_id.value()));
        active.status = Set(AssetStatus::Assigned.as_str().to_string());
        touch(&mut active, actor);
        let model = active
            .update(&self.conn)
            .await
            .context("Failed to assign asset")?;

        Self::load(&self.conn, model.id).await.map(Some)
    }

    pub async fn count_by_status(&self, status: AssetStatus) -> Result<u64> {
        Assets::find()
            .filter(assets::Column::Status.eq(status.as_str()))
            .count(&self.conn)
            .await
            .context("Failed to count assets by status")
    }

    /// Aggregates over non-disposed assets. Licenses with no expiry date or
    /// one strictly after `today` count as active.
    pub async fn dashboard_stats(&self, today: NaiveDate) -> Result<DashboardStats> {
        let prices: Vec<String> = Assets::find()
            .select_only()
            .column(assets::Column::PurchasePrice)
            .filter(not_disposed())
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to load purchase prices")?;

        let total_value = prices
            .iter()
            .map(|raw| Decimal::from_str(raw).context("Corrupt purchase_price column"))
            .sum::<Result<Decimal>>()?;

        let active_licenses = Assets::find()
            .filter(not_disposed())
            .filter(assets::Column::Kind.eq(AssetKind::Software.as_str()))
            .filter(
                sea_orm::Condition::any()
                    .add(assets::Column::ExpiryDate.is_null())
                    .add(assets::Column::ExpiryDate.gt(today)),
            )
            .count(&self.conn)
            .await
            .context("Failed to count active licenses")?;

        Ok(DashboardStats {
            total_assets: prices.len() as u64,
            total_value,
            active_licenses,
            available_assets: self.count_by_status(AssetStatus::Available).await?,
        })
    }
}
