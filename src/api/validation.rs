use super::{ApiError, PageQuery};
use crate::domain::{AssetStatus, Role, SortOrder};
use crate::models::asset::{AssetSortField, PageRequest};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn validate_id(id: i32, resource: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {resource} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Unwraps a required request field.
pub fn require<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::validation(format!("{field} is required")))
}

pub fn require_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    let value = require(value, field)?;
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.trim().to_string())
}

pub fn parse_status(raw: &str) -> Result<AssetStatus, ApiError> {
    raw.trim().parse().map_err(|_| {
        ApiError::validation(format!(
            "Invalid status: '{raw}'. Expected one of AVAILABLE, ASSIGNED, BROKEN, REPAIRING, DISPOSED"
        ))
    })
}

pub fn parse_role(raw: &str) -> Result<Role, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid role: '{raw}'. Expected USER or ADMIN")))
}

pub fn validate_page(query: &PageQuery) -> Result<PageRequest, ApiError> {
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(ApiError::validation(format!(
            "Invalid page size: {size}. Size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let sort_by = match query.sort_by.as_deref() {
        None | Some("") => AssetSortField::default(),
        Some(field) => field.parse().map_err(|_| {
            ApiError::validation(format!(
                "Invalid sort field: '{field}'. Expected id, name, purchase_date, status or created_at"
            ))
        })?,
    };

    let order = match query.sort_dir.as_deref() {
        None | Some("") => SortOrder::Ascending,
        Some(dir) => dir.parse().map_err(|_| {
            ApiError::validation(format!("Invalid sort direction: '{dir}'. Expected asc or desc"))
        })?,
    };

    let page = query.page.unwrap_or(0);
    let in_range = page
        .checked_mul(size)
        .is_some_and(|offset| i64::try_from(offset).is_ok());
    if !in_range {
        return Err(ApiError::validation(format!(
            "Invalid page number: {page}. Page is out of range"
        )));
    }

    Ok(PageRequest {
        page,
        size,
        sort_by,
        order,
    })
}

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if trimmed.len() > 50 {
        return Err(ApiError::validation(
            "Username must be 50 characters or less",
        ));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(ApiError::validation(
            "Username can only contain letters, numbers, dots, hyphens, and underscores",
        ));
    }
    Ok(trimmed)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    let valid = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(ApiError::validation(format!("Invalid email address: '{trimmed}'")));
    }
    Ok(trimmed)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(password)
}
