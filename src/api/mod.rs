use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AssetService, AuthService, UserService};
use crate::state::SharedState;

mod admin;
mod assets;
pub mod auth;
mod error;
mod observability;
pub mod policy;
mod types;
mod users;
mod validation;

pub use auth::Principal;
pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn asset_service(&self) -> &Arc<dyn AssetService> {
        &self.shared.asset_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().read().await.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/authenticate", post(auth::authenticate))
        .merge(create_protected_router())
        .merge(create_admin_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authentication_gate,
        ))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    // Outermost first: the request span must be open before the gate runs
    Router::new().nest("/api/v1", api_router).layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(observability::logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer.allow_methods(Any).allow_headers(Any)),
    )
}

/// Routes open to any authenticated identity.
fn create_protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/users", get(users::list_users))
        .route("/assets", get(assets::list_assets))
        .route("/assets/search", get(assets::search_assets))
        .route("/assets/stats", get(assets::get_stats))
        .route("/assets/recent", get(assets::recent_assets))
        .route("/assets/hardware", post(assets::create_hardware))
        .route("/assets/software", post(assets::create_software))
        .route("/assets/batch/hardware", post(assets::create_hardware_batch))
        .route("/assets/batch/software", post(assets::create_software_batch))
        .route(
            "/assets/{id}",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/assets/{id}/value", get(assets::get_asset_value))
        .route("/assets/{id}/assign", post(assets::assign_asset))
        .route_layer(middleware::from_fn(policy::require_authenticated))
}

fn create_admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}/role", put(admin::update_role))
        .route("/admin/users/{id}/status", put(admin::update_status))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(policy::require_admin))
}
