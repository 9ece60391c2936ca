pub mod asset_service;
pub mod asset_service_impl;
pub use asset_service::{AssetError, AssetService, AssetValuation};
pub use asset_service_impl::SeaOrmAssetService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, AuthToken, Registration, TokenIdentity};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{UserError, UserService};
pub use user_service_impl::SeaOrmUserService;
