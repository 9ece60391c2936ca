//! Hash password command handler

use crate::config::Config;
use crate::security::password::hash_password;

pub fn cmd_hash_password(config: &Config, password: &str) -> anyhow::Result<()> {
    let hash = hash_password(password, &config.security)?;
    println!("{hash}");
    Ok(())
}
