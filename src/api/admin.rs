use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::Principal;
use super::validation::{parse_role, validate_id};
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::domain::UserId;

#[derive(Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub enabled: bool,
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.user_service().list_users().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// PUT /admin/users/{id}/role
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<RoleRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = UserId::new(validate_id(id, "user")?);
    let role = parse_role(&payload.role)?;

    let user = state.user_service().change_role(id, role).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// PUT /admin/users/{id}/status?enabled=bool
/// An admin may not disable their own account (409).
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<i32>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = UserId::new(validate_id(id, "user")?);

    let user = state
        .user_service()
        .set_enabled(principal.id, id, query.enabled)
        .await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}
