use sea_orm::entity::prelude::*;

/// Hardware and software assets share one table; `kind` says which of the
/// variant column groups is populated.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// `HARDWARE` or `SOFTWARE`
    pub kind: String,

    pub name: String,

    /// Decimal rendered as text, e.g. `"1299.99"`
    pub purchase_price: String,

    pub purchase_date: Date,

    #[sea_orm(indexed)]
    pub status: String,

    pub residual_value: String,

    pub useful_life_years: i32,

    pub assigned_to_id: Option<i32>,

    // Hardware
    #[sea_orm(unique)]
    pub serial_number: Option<String>,
    pub warranty_end_date: Option<Date>,
    pub location: Option<String>,
    pub last_maintenance_date: Option<Date>,
    pub maintenance_interval_months: Option<i32>,

    // Software
    pub license_key: Option<String>,
    pub expiry_date: Option<Date>,

    pub created_by: Option<String>,
    #[sea_orm(indexed)]
    pub created_at: String,
    pub last_modified_by: Option<String>,
    pub last_modified_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AssignedToId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    AssignedTo,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedTo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
