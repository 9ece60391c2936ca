mod common;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use assetrack::db::Store;
use assetrack::domain::{AssetId, AssetStatus, Role};
use assetrack::models::asset::{
    AssetCriteria, AssetDetails, HardwareDetails, NewAsset, PageRequest, SoftwareDetails,
};
use assetrack::services::{AssetError, AssetService, SeaOrmAssetService};

async fn test_store() -> (Store, assetrack::config::Config) {
    let config = common::test_config();
    let store = Store::new(&config.general.database_path).await.unwrap();
    (store, config)
}

fn hardware(name: &str, serial: Option<&str>) -> NewAsset {
    NewAsset {
        name: name.to_string(),
        purchase_price: Decimal::new(120_000, 2),
        purchase_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
        status: AssetStatus::Available,
        residual_value: Decimal::ZERO,
        useful_life_years: 4,
        details: AssetDetails::Hardware(HardwareDetails {
            serial_number: serial.map(str::to_string),
            ..Default::default()
        }),
    }
}

#[tokio::test]
async fn test_bootstrap_admin_is_seeded_once() {
    let (store, config) = test_store().await;

    let created = store
        .ensure_bootstrap_admin(&config.bootstrap, &config.security)
        .await
        .unwrap();
    assert!(created);

    let again = store
        .ensure_bootstrap_admin(&config.bootstrap, &config.security)
        .await
        .unwrap();
    assert!(!again);

    let users = store.user_repo();
    assert_eq!(users.count_by_role(Role::Admin).await.unwrap(), 1);
    let admin = users.get_by_username("admin").await.unwrap().unwrap();
    assert!(admin.is_admin());
    assert!(admin.enabled);
}

#[tokio::test]
async fn test_store_ping_and_migrations_are_idempotent() {
    let (store, config) = test_store().await;
    store.ping().await.unwrap();

    // Reconnecting re-runs the migrator against an existing schema.
    let reopened = Store::new(&config.general.database_path).await.unwrap();
    reopened.ping().await.unwrap();
}

#[tokio::test]
async fn test_batch_rollback_leaves_no_partial_rows() {
    let (store, _) = test_store().await;
    let service = SeaOrmAssetService::new(store.clone());

    service
        .create(hardware("Existing", Some("DELL-002")), "admin")
        .await
        .unwrap();

    let err = service
        .create_batch_hardware(hardware("Dell Dock", None), 3, "DELL-", "admin")
        .await
        .unwrap_err();
    assert!(matches!(err, AssetError::Conflict(_)), "{err:?}");

    let page = store
        .asset_repo()
        .search(&AssetCriteria::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_elements, 1);
}

#[tokio::test]
async fn test_software_without_serial_and_delete_semantics() {
    let (store, _) = test_store().await;
    let service = SeaOrmAssetService::new(store.clone());

    let software = service
        .create(
            NewAsset {
                details: AssetDetails::Software(SoftwareDetails {
                    license_key: Some("LIC-1".to_string()),
                    expiry_date: None,
                }),
                ..hardware("License", None)
            },
            "admin",
        )
        .await
        .unwrap();

    service.delete(software.id, "admin").await.unwrap();
    assert!(matches!(
        service.delete(software.id, "admin").await,
        Err(AssetError::NotFound(_))
    ));
    assert!(matches!(
        service.get(AssetId::new(9999)).await,
        Err(AssetError::NotFound(_))
    ));

    let stats = service.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_assets, 0);
    assert_eq!(stats.active_licenses, 0);
    assert_eq!(stats.total_value, Decimal::ZERO);
}

#[tokio::test]
async fn test_two_hardware_assets_without_serial() {
    let (store, _) = test_store().await;
    let service = SeaOrmAssetService::new(store);

    service.create(hardware("Chair", None), "admin").await.unwrap();
    service.create(hardware("Desk", None), "admin").await.unwrap();

    let recent = service.recent_assets().await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].name, "Desk");
}
