pub mod asset;
pub mod user;
