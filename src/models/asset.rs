use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{AssetId, AssetKind, AssetStatus, SortOrder, UserId};

/// A tracked asset. Common fields live on the struct; variant fields live in
/// [`AssetDetails`], which is flattened into the JSON with a `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    pub status: AssetStatus,
    pub residual_value: Decimal,
    pub useful_life_years: i32,
    pub assigned_to: Option<AssignedUser>,
    #[serde(flatten)]
    pub details: AssetDetails,
    pub created_by: Option<String>,
    pub created_at: String,
    pub last_modified_by: Option<String>,
    pub last_modified_at: String,
}

impl Asset {
    #[must_use]
    pub const fn kind(&self) -> AssetKind {
        self.details.kind()
    }
}

/// Non-owning reference to the user an asset is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedUser {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetDetails {
    Hardware(HardwareDetails),
    Software(SoftwareDetails),
}

impl AssetDetails {
    #[must_use]
    pub const fn kind(&self) -> AssetKind {
        match self {
            Self::Hardware(_) => AssetKind::Hardware,
            Self::Software(_) => AssetKind::Software,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareDetails {
    pub serial_number: Option<String>,
    pub warranty_end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub last_maintenance_date: Option<NaiveDate>,
    pub maintenance_interval_months: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareDetails {
    pub license_key: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

/// Fields required to persist a new asset. Also used as the template for
/// batch provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAsset {
    pub name: String,
    pub purchase_price: Decimal,
    pub purchase_date: NaiveDate,
    pub status: AssetStatus,
    pub residual_value: Decimal,
    pub useful_life_years: i32,
    pub details: AssetDetails,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPatch {
    pub name: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub useful_life_years: Option<i32>,
    pub residual_value: Option<Decimal>,
    pub status: Option<AssetStatus>,
}

/// Search criteria. Every field is optional and absent ones add no predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetCriteria {
    pub query: Option<String>,
    pub status: Option<AssetStatus>,
    pub serial_number: Option<String>,
    pub assigned_to_user_id: Option<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetSortField {
    #[default]
    Id,
    Name,
    PurchaseDate,
    Status,
    CreatedAt,
}

impl std::str::FromStr for AssetSortField {
    type Err = crate::domain::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "purchase_date" | "purchaseDate" => Ok(Self::PurchaseDate),
            "status" => Ok(Self::Status),
            "created_at" | "createdAt" => Ok(Self::CreatedAt),
            other => Err(crate::domain::ParseEnumError {
                kind: "sort field",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort_by: AssetSortField,
    pub order: SortOrder,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            sort_by: AssetSortField::Id,
            order: SortOrder::Ascending,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_assets: u64,
    pub total_value: Decimal,
    pub active_licenses: u64,
    pub available_assets: u64,
}
