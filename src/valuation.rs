//! Straight-line depreciation.
//!
//! The annual charge is `(price - residual) / life`, rounded half-up to two
//! decimal places before it is multiplied by the whole years elapsed. The
//! result never drops below the residual value.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::asset::Asset;

/// Inputs to the depreciation calculation. Any missing input that the
/// formula needs yields a value of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepreciationInput {
    pub purchase_price: Option<Decimal>,
    pub residual_value: Option<Decimal>,
    pub useful_life_years: Option<i32>,
    pub purchase_date: Option<NaiveDate>,
}

impl From<&Asset> for DepreciationInput {
    fn from(asset: &Asset) -> Self {
        Self {
            purchase_price: Some(asset.purchase_price),
            residual_value: Some(asset.residual_value),
            useful_life_years: Some(asset.useful_life_years),
            purchase_date: Some(asset.purchase_date),
        }
    }
}

/// Whole years between `from` and `to`, truncated. A date in the future
/// counts as zero years.
#[must_use]
pub fn whole_years_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.years_since(from).map_or(0, i64::from)
}

/// Current depreciated value as of `today`.
#[must_use]
pub fn calculate_current_value(input: &DepreciationInput, today: NaiveDate) -> Decimal {
    let (Some(price), Some(life), Some(purchase_date)) = (
        input.purchase_price,
        input.useful_life_years,
        input.purchase_date,
    ) else {
        return Decimal::ZERO;
    };

    if life <= 0 {
        return Decimal::ZERO;
    }

    let residual = input.residual_value.unwrap_or(Decimal::ZERO);
    let years_used = whole_years_between(purchase_date, today);

    if years_used >= i64::from(life) {
        return residual;
    }

    let annual = ((price - residual) / Decimal::from(life))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let total = annual * Decimal::from(years_used);

    (price - total).max(residual)
}

/// Convenience wrapper over [`calculate_current_value`] for a stored asset.
#[must_use]
pub fn current_value_of(asset: &Asset, today: NaiveDate) -> Decimal {
    calculate_current_value(&DepreciationInput::from(asset), today)
}
