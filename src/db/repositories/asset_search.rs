//! Translates [`AssetCriteria`] into a SeaORM [`Condition`].
//!
//! Queries built here assume the `users` table is left-joined on
//! `assets.assigned_to_id`, which `find_also_related(Users)` provides.

use sea_orm::sea_query::{BinOper, Expr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, Order};

use crate::domain::{AssetKind, AssetStatus, SortOrder};
use crate::entities::{assets, users};
use crate::models::asset::{AssetCriteria, AssetSortField};

/// Rows hidden from every default query.
#[must_use]
pub fn not_disposed() -> SimpleExpr {
    assets::Column::Status.ne(AssetStatus::Disposed.as_str())
}

fn is_kind(kind: AssetKind) -> SimpleExpr {
    assets::Column::Kind.eq(kind.as_str())
}

fn single_char(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    let c = mapped.next()?;
    mapped.next().is_none().then_some(c)
}

/// `*needle*` as a case-insensitive GLOB.
///
/// SQLite's `LOWER` and `LIKE` only fold ASCII, so every cased character
/// becomes a class holding its single-char lower and upper forms instead.
fn glob_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() * 4 + 2);
    pattern.push('*');
    for c in needle.chars() {
        let mut variants = vec![c];
        for variant in [
            single_char(c.to_lowercase()),
            single_char(c.to_uppercase()),
        ]
        .into_iter()
        .flatten()
        {
            if !variants.contains(&variant) {
                variants.push(variant);
            }
        }

        if variants.len() > 1 || matches!(c, '*' | '?' | '[') {
            pattern.push('[');
            pattern.extend(variants);
            pattern.push(']');
        } else {
            pattern.push(c);
        }
    }
    pattern.push('*');
    pattern
}

fn contains_ignore_case<C: sea_orm::sea_query::IntoColumnRef>(
    column: C,
    needle: &str,
) -> SimpleExpr {
    Expr::col(column).binary(BinOper::Custom("GLOB"), glob_pattern(needle))
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Conjunction of every present criterion plus the disposed-row exclusion.
#[must_use]
pub fn criteria_condition(criteria: &AssetCriteria) -> Condition {
    let mut condition = Condition::all().add(not_disposed());

    if let Some(query) = non_blank(criteria.query.as_ref()) {
        condition = condition.add(
            Condition::any()
                .add(contains_ignore_case(
                    (assets::Entity, assets::Column::Name),
                    query,
                ))
                .add(
                    Condition::all().add(is_kind(AssetKind::Hardware)).add(
                        contains_ignore_case((assets::Entity, assets::Column::SerialNumber), query),
                    ),
                )
                .add(
                    Condition::all().add(is_kind(AssetKind::Software)).add(
                        contains_ignore_case((assets::Entity, assets::Column::LicenseKey), query),
                    ),
                )
                .add(contains_ignore_case((users::Entity, users::Column::Username), query)),
        );
    }

    if let Some(status) = criteria.status {
        condition = condition.add(assets::Column::Status.eq(status.as_str()));
    }

    if let Some(serial) = non_blank(criteria.serial_number.as_ref()) {
        condition = condition.add(is_kind(AssetKind::Hardware)).add(contains_ignore_case(
            (assets::Entity, assets::Column::SerialNumber),
            serial,
        ));
    }

    if let Some(user_id) = criteria.assigned_to_user_id {
        condition = condition.add(users::Column::Id.eq(user_id.value()));
    }

    condition
}

#[must_use]
pub const fn sort_column(field: AssetSortField) -> assets::Column {
    match field {
        AssetSortField::Id => assets::Column::Id,
        AssetSortField::Name => assets::Column::Name,
        AssetSortField::PurchaseDate => assets::Column::PurchaseDate,
        AssetSortField::Status => assets::Column::Status,
        AssetSortField::CreatedAt => assets::Column::CreatedAt,
    }
}

#[must_use]
pub const fn sort_order(order: SortOrder) -> Order {
    match order {
        SortOrder::Ascending => Order::Asc,
        SortOrder::Descending => Order::Desc,
    }
}
