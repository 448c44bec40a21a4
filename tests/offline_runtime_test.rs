use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use procure_client::config::RuntimeConfig;
use procure_client::error::RuntimeError;
use procure_client::services::{CoreContext, Services};
use procure_client::storage::MemoryKv;
use tempfile::TempDir;

fn offline_services() -> Services {
    let config = RuntimeConfig::offline(PathBuf::from("unused"));
    Services::new(CoreContext::with_kv(config, None, Arc::new(MemoryKv::new())))
}

fn offline_services_at(dir: &TempDir) -> Services {
    let config = RuntimeConfig::offline(dir.path().to_path_buf());
    Services::new(CoreContext::new(config, None))
}

#[tokio::test]
async fn cart_accumulates_quantity_per_sku() -> Result<()> {
    let services = offline_services();

    services.cart.add_item("sku-1", 2).await?;
    let cart = services.cart.add_item("sku-1", 3).await?;

    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].qty, 5);

    let cart = services.cart.remove_item("sku-1").await?;
    assert!(cart.lines.is_empty());
    assert_eq!(cart.total_fen, 0);
    Ok(())
}

#[tokio::test]
async fn cart_survives_process_restart() -> Result<()> {
    let dir = tempfile::tempdir()?;

    {
        let services = offline_services_at(&dir);
        services.cart.add_item("sku-spu-1001-1", 4).await?;
    }

    // A fresh context over the same state dir sees the persisted cart.
    let services = offline_services_at(&dir);
    let cart = services.cart.get_cart().await?;
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].qty, 4);
    Ok(())
}

#[tokio::test]
async fn reset_returns_to_first_run_defaults() -> Result<()> {
    let services = offline_services();

    services.auth.login().await?;
    services.cart.add_item("sku-1", 2).await?;
    services.wishlist.add("sku-2").await?;

    services.reset_offline_state().await;

    let state = services.context().mock.load().await;
    assert!(state.cart_entries.is_empty());
    assert!(state.wishlist_sku_ids.is_empty());
    assert!(state.orders.is_empty());
    assert_eq!(services.context().tokens.get_token().await, None);
    Ok(())
}

#[tokio::test]
async fn wishlist_toggle_round_trips() -> Result<()> {
    let services = offline_services();

    let list = services.wishlist.toggle("sku-spu-1003-1").await?;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, "sku-spu-1003-1");

    let list = services.wishlist.toggle("sku-spu-1003-1").await?;
    assert!(list.is_empty());
    Ok(())
}

#[tokio::test]
async fn price_tiers_pin_on_first_detail_fetch() -> Result<()> {
    let services = offline_services();

    let first = services.catalog.get_product_detail("spu-1002").await?;
    let second = services.catalog.get_product_detail("spu-1002").await?;

    // Pinned overrides keep repeated fetches identical.
    for (a, b) in first.skus.iter().zip(second.skus.iter()) {
        assert_eq!(a.price_tiers, b.price_tiers);
    }

    let state = services.context().mock.load().await;
    for sku in &first.skus {
        assert!(state.sku_price_tiers_by_sku_id.contains_key(&sku.id));
    }
    Ok(())
}

#[tokio::test]
async fn unknown_product_fails_with_api_error_shape() {
    let services = offline_services();

    let err = services.catalog.get_product_detail("spu-9999").await.unwrap_err();
    match err {
        RuntimeError::Api(api) => {
            assert_eq!(api.status_code, 404);
            assert_eq!(api.code.as_deref(), Some("PRODUCT_NOT_FOUND"));
            assert!(!api.message.is_empty());
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn address_default_flag_is_exclusive() -> Result<()> {
    let services = offline_services();

    let home = procure_client::domain::Address {
        id: None,
        contact_name: "A".to_string(),
        phone: "1".to_string(),
        province: "P".to_string(),
        city: "C".to_string(),
        district: "D".to_string(),
        detail: "one".to_string(),
        is_default: true,
    };
    let saved_a = services.addresses.save(home.clone()).await?;

    let mut second = home;
    second.detail = "two".to_string();
    services.addresses.save(second).await?;

    let all = services.addresses.list().await?;
    assert_eq!(all.len(), 2);
    let defaults: Vec<_> = all.iter().filter(|a| a.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].detail, "two");

    services.addresses.delete(saved_a.id.as_deref().unwrap()).await?;
    assert_eq!(services.addresses.list().await?.len(), 1);
    Ok(())
}
