pub use super::assets::Entity as Assets;
pub use super::users::Entity as Users;
