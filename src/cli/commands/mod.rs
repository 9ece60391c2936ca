mod hash_password;
mod stats;
mod users;

pub use hash_password::cmd_hash_password;
pub use stats::cmd_stats;
pub use users::cmd_list_users;
