//! Walkthrough of the offline runtime: every facade exercised once, with
//! the snapshot printed between steps. Useful when changing reducers or
//! projections by hand.

use procure_client::config::RuntimeConfig;
use procure_client::domain::order::{DraftItem, OrderDraft};
use procure_client::domain::Address;
use procure_client::services::{CoreContext, Services};

fn address() -> Address {
    Address {
        id: None,
        contact_name: "Warehouse A".to_string(),
        phone: "13900000000".to_string(),
        province: "Jiangsu".to_string(),
        city: "Suzhou".to_string(),
        district: "Wuzhong".to_string(),
        detail: "9 Canal Rd".to_string(),
        is_default: true,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RuntimeConfig::offline(".procure-demo-state".into());
    let services = Services::new(CoreContext::new(config, None));
    // Each run starts from first-run defaults.
    services.reset_offline_state().await;

    println!("=== catalog ===");
    let page = services.catalog.search_products("", 1).await?;
    for item in &page.items {
        println!("  {} - {} (from {} fen)", item.spu_id, item.name, item.min_price_fen);
    }

    println!("=== wishlist ===");
    let detail = services.catalog.get_product_detail("spu-1003").await?;
    let goggles = detail.skus[0].id.clone();
    let wishlist = services.wishlist.toggle(&goggles).await?;
    println!("  {} item(s) wished", wishlist.len());

    println!("=== cart ===");
    services.cart.add_item(&goggles, 4).await?;
    services.cart.add_item("sku-spu-1004-1", 12).await?;
    let cart = services.cart.get_cart().await?;
    for line in &cart.lines {
        println!("  {} x{} = {} fen", line.sku.spec, line.qty, line.line_total_fen);
    }

    println!("=== order ===");
    let order = services
        .orders
        .submit(OrderDraft {
            items: cart
                .lines
                .iter()
                .map(|l| DraftItem { sku_id: l.sku.id.clone(), qty: l.qty })
                .collect(),
            address: address(),
            remark: None,
        })
        .await?;
    println!("  {} ({:?}), {} fen", order.id, order.status, order.total_fen());

    println!("=== inquiry ===");
    let inquiry = services
        .inquiries
        .create("bulk pricing for goggles?", Some(goggles.as_str()))
        .await?;
    services
        .inquiries
        .post_message(&inquiry.id, "we need roughly 500 units per quarter")
        .await?;
    let thread = services.inquiries.get_messages(&inquiry.id).await?;
    println!("  {} message(s) in thread", thread.len());

    println!("=== product request ===");
    let request = services
        .product_requests
        .submit("ESD-safe tweezers", "stainless, curved tip", 50)
        .await?;
    println!("  {} ({:?})", request.id, request.status);

    println!("=== final snapshot ===");
    let state = services.context().mock.load().await;
    println!(
        "  {} order(s), {} cart line(s), {} inquiry(ies)",
        state.orders.len(),
        state.cart_entries.len(),
        state.inquiries.len()
    );

    Ok(())
}
