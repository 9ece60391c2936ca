use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

use super::auth::Principal;
use super::validation::{parse_status, require, require_text, validate_id, validate_page};
use super::{ApiError, ApiResponse, AppState, PageQuery};
use crate::domain::{AssetId, AssetStatus, UserId};
use crate::models::asset::{
    Asset, AssetCriteria, AssetDetails, AssetPatch, DashboardStats, HardwareDetails, NewAsset,
    Page, SoftwareDetails,
};
use crate::services::{AssetError, AssetValuation};

impl From<AssetError> for ApiError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::NotFound(id) => Self::not_found("Asset", id),
            AssetError::UserNotFound(id) => Self::not_found("User", id),
            AssetError::Validation(msg) => Self::validation(msg),
            AssetError::Conflict(msg) => Self::Conflict(msg),
            AssetError::Database(msg) => Self::DatabaseError(msg),
            AssetError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// Fields shared by every asset payload. All optional at the wire level so
/// a missing field becomes a 400 with a message instead of a decode error.
#[derive(Debug, Default, Deserialize)]
pub struct CommonAssetFields {
    pub name: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub residual_value: Option<Decimal>,
    pub useful_life_years: Option<i32>,
}

impl CommonAssetFields {
    fn into_new_asset(self, details: AssetDetails) -> Result<NewAsset, ApiError> {
        let status = match self.status.as_deref() {
            Some(raw) => parse_status(raw)?,
            None => AssetStatus::Available,
        };

        Ok(NewAsset {
            name: require_text(self.name, "name")?,
            purchase_price: require(self.purchase_price, "purchase_price")?,
            purchase_date: require(self.purchase_date, "purchase_date")?,
            status,
            residual_value: self.residual_value.unwrap_or(Decimal::ZERO),
            useful_life_years: require(self.useful_life_years, "useful_life_years")?,
            details,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct HardwareRequest {
    #[serde(flatten)]
    pub common: CommonAssetFields,
    pub serial_number: Option<String>,
    pub warranty_end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub last_maintenance_date: Option<NaiveDate>,
    pub maintenance_interval_months: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SoftwareRequest {
    #[serde(flatten)]
    pub common: CommonAssetFields,
    pub license_key: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct BatchHardwareRequest {
    #[serde(flatten)]
    pub common: CommonAssetFields,
    pub location: Option<String>,
    #[serde(alias = "warranty_date")]
    pub warranty_end_date: Option<NaiveDate>,
    #[serde(alias = "serial_number_prefix")]
    pub serial_prefix: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct BatchSoftwareRequest {
    #[serde(flatten)]
    pub common: CommonAssetFields,
    pub license_key: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub quantity: Option<u32>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAssetRequest {
    pub name: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub useful_life_years: Option<i32>,
    pub residual_value: Option<Decimal>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub user_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "serialNumber")]
    pub serial_number: Option<String>,
    #[serde(alias = "assignedToUserId")]
    pub assigned_to_user_id: Option<i32>,
}

impl SearchQuery {
    fn into_criteria(self) -> Result<AssetCriteria, ApiError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_status(raw)?),
        };
        let assigned_to_user_id = self
            .assigned_to_user_id
            .map(|id| validate_id(id, "user").map(UserId::new))
            .transpose()?;

        Ok(AssetCriteria {
            query: self.query,
            status,
            serial_number: self.serial_number,
            assigned_to_user_id,
        })
    }
}

fn asset_id(id: i32) -> Result<AssetId, ApiError> {
    validate_id(id, "asset").map(AssetId::new)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /assets
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ApiResponse<Page<Asset>>>, ApiError> {
    let page = validate_page(&page)?;
    let assets = state.asset_service().list(page).await?;
    Ok(Json(ApiResponse::success(assets)))
}

/// GET /assets/search
pub async fn search_assets(
    State(state): State<Arc<AppState>>,
    Query(criteria): Query<SearchQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ApiResponse<Page<Asset>>>, ApiError> {
    let page = validate_page(&page)?;
    let criteria = criteria.into_criteria()?;
    let assets = state.asset_service().search(criteria, page).await?;
    Ok(Json(ApiResponse::success(assets)))
}

/// GET /assets/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let stats = state.asset_service().dashboard_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// GET /assets/recent
pub async fn recent_assets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Asset>>>, ApiError> {
    let assets = state.asset_service().recent_assets().await?;
    Ok(Json(ApiResponse::success(assets)))
}

/// GET /assets/{id}
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Asset>>, ApiError> {
    let asset = state.asset_service().get(asset_id(id)?).await?;
    Ok(Json(ApiResponse::success(asset)))
}

/// GET /assets/{id}/value
pub async fn get_asset_value(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<AssetValuation>>, ApiError> {
    let valuation = state.asset_service().current_value(asset_id(id)?).await?;
    Ok(Json(ApiResponse::success(valuation)))
}

/// POST /assets/hardware
pub async fn create_hardware(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(payload): Json<HardwareRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Asset>>), ApiError> {
    let asset = payload
        .common
        .into_new_asset(AssetDetails::Hardware(HardwareDetails {
            serial_number: payload.serial_number.filter(|s| !s.trim().is_empty()),
            warranty_end_date: payload.warranty_end_date,
            location: payload.location,
            last_maintenance_date: payload.last_maintenance_date,
            maintenance_interval_months: payload.maintenance_interval_months,
        }))?;

    let created = state
        .asset_service()
        .create(asset, &principal.username)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// POST /assets/software
pub async fn create_software(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(payload): Json<SoftwareRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Asset>>), ApiError> {
    let asset = payload
        .common
        .into_new_asset(AssetDetails::Software(SoftwareDetails {
            license_key: payload.license_key,
            expiry_date: payload.expiry_date,
        }))?;

    let created = state
        .asset_service()
        .create(asset, &principal.username)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// PUT /assets/{id}
pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateAssetRequest>,
) -> Result<Json<ApiResponse<Asset>>, ApiError> {
    let id = asset_id(id)?;
    let patch = AssetPatch {
        name: payload.name,
        purchase_price: payload.purchase_price,
        purchase_date: payload.purchase_date,
        useful_life_years: payload.useful_life_years,
        residual_value: payload.residual_value,
        status: payload.status.as_deref().map(parse_status).transpose()?,
    };

    let updated = state
        .asset_service()
        .update(id, patch, &principal.username)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /assets/{id}
/// Soft delete: the asset becomes `DISPOSED` and disappears from listings
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .asset_service()
        .delete(asset_id(id)?, &principal.username)
        .await?;
    Ok(Json(ApiResponse::success(())))
}

/// POST /assets/{id}/assign
pub async fn assign_asset(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    Json(payload): Json<AssignRequest>,
) -> Result<Json<ApiResponse<Asset>>, ApiError> {
    let id = asset_id(id)?;
    let user_id = UserId::new(validate_id(require(payload.user_id, "user_id")?, "user")?);

    let assigned = state
        .asset_service()
        .assign(id, user_id, &principal.username)
        .await?;
    Ok(Json(ApiResponse::success(assigned)))
}

/// POST /assets/batch/hardware
pub async fn create_hardware_batch(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(payload): Json<BatchHardwareRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Asset>>>), ApiError> {
    let quantity = require(payload.quantity, "quantity")?;
    let prefix = require_text(payload.serial_prefix, "serial_prefix")?;
    let template = payload
        .common
        .into_new_asset(AssetDetails::Hardware(HardwareDetails {
            location: payload.location,
            warranty_end_date: payload.warranty_end_date,
            ..Default::default()
        }))?;

    let created = state
        .asset_service()
        .create_batch_hardware(template, quantity, &prefix, &principal.username)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// POST /assets/batch/software
pub async fn create_software_batch(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(payload): Json<BatchSoftwareRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Asset>>>), ApiError> {
    let quantity = require(payload.quantity, "quantity")?;
    let template = payload
        .common
        .into_new_asset(AssetDetails::Software(SoftwareDetails {
            license_key: payload.license_key,
            expiry_date: payload.expiry_date,
        }))?;

    let created = state
        .asset_service()
        .create_batch_software(template, quantity, &principal.username)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_payload_defaults_status_and_residual() {
        let payload: HardwareRequest = serde_json::from_value(serde_json::json!({
            "name": "ThinkPad",
            "purchase_price": "1499.00",
            "purchase_date": "2024-02-01",
            "useful_life_years": 4,
            "serial_number": "TP-1"
        }))
        .unwrap();

        let asset = payload
            .common
            .into_new_asset(AssetDetails::Hardware(HardwareDetails::default()))
            .unwrap();
        assert_eq!(asset.status, AssetStatus::Available);
        assert_eq!(asset.residual_value, Decimal::ZERO);
    }

    #[test]
    fn numeric_prices_are_accepted() {
        let payload: SoftwareRequest = serde_json::from_value(serde_json::json!({
            "name": "IDE",
            "purchase_price": 199,
            "purchase_date": "2024-02-01",
            "useful_life_years": 1
        }))
        .unwrap();
        assert_eq!(payload.common.purchase_price, Some(Decimal::from(199)));
    }

    #[test]
    fn missing_required_field_is_a_validation_error() {
        let fields = CommonAssetFields {
            name: Some("Monitor".to_string()),
            ..Default::default()
        };
        let err = fields
            .into_new_asset(AssetDetails::Software(SoftwareDetails::default()))
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(msg) if msg.contains("purchase_price")));
    }

    #[test]
    fn malformed_status_is_rejected() {
        let fields = CommonAssetFields {
            name: Some("Monitor".to_string()),
            status: Some("SHINY".to_string()),
            ..Default::default()
        };
        assert!(
            fields
                .into_new_asset(AssetDetails::Software(SoftwareDetails::default()))
                .is_err()
        );
    }

    #[test]
    fn batch_payload_accepts_original_field_names() {
        let payload: BatchHardwareRequest = serde_json::from_value(serde_json::json!({
            "name": "Dell Monitor",
            "purchase_price": 250,
            "purchase_date": "2024-02-01",
            "useful_life_years": 5,
            "serial_number_prefix": "DELL-MON-",
            "warranty_date": "2027-02-01",
            "quantity": 3
        }))
        .unwrap();
        assert_eq!(payload.serial_prefix.as_deref(), Some("DELL-MON-"));
        assert_eq!(payload.quantity, Some(3));
        assert!(payload.warranty_end_date.is_some());
    }

    #[test]
    fn search_query_maps_to_criteria() {
        let criteria = SearchQuery {
            query: Some("dell".to_string()),
            status: Some("AVAILABLE".to_string()),
            ..Default::default()
        }
        .into_criteria()
        .unwrap();
        assert_eq!(criteria.status, Some(AssetStatus::Available));

        let bad = SearchQuery {
            status: Some("NOPE".to_string()),
            ..Default::default()
        };
        assert!(bad.into_criteria().is_err());
    }
}
