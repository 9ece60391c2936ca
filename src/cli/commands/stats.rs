//! Dashboard statistics command handler

use crate::config::Config;
use crate::db::Store;
use crate::services::{AssetService, SeaOrmAssetService};

pub async fn cmd_stats(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let service = SeaOrmAssetService::new(store);

    let stats = service.dashboard_stats().await?;
    let recent = service.recent_assets().await?;

    println!("Asset Dashboard");
    println!("{:-<40}", "");
    println!("  Total assets:     {}", stats.total_assets);
    println!("  Total value:      {}", stats.total_value);
    println!("  Active licenses:  {}", stats.active_licenses);
    println!("  Available:        {}", stats.available_assets);

    if !recent.is_empty() {
        println!();
        println!("Recently added:");
        for asset in recent {
            println!("  #{} {} [{}] {}", asset.id, asset.name, asset.kind(), asset.status);
        }
    }

    Ok(())
}
