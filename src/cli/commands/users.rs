//! List users command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_users(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let users = store.user_repo().list_all().await?;

    if users.is_empty() {
        println!("No user accounts yet.");
        println!();
        println!("Start the server once to seed the bootstrap admin: assetrack serve");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        let marker = if user.enabled { "•" } else { "✗" };
        println!(
            "{} {} <{}> [{}]",
            marker,
            user.username,
            user.email,
            user.role.authority()
        );
        println!(
            "  ID: {} | Name: {} {} | Created: {}",
            user.id, user.firstname, user.lastname, user.created_at
        );
    }

    println!();
    println!("Legend: • Enabled | ✗ Disabled");

    Ok(())
}
