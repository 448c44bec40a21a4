//! Read-side projections: derive API-shaped responses from the snapshot so
//! the offline facades return exactly what the live backend would.

use crate::domain::cart::{Cart, CartLine};
use crate::domain::catalog::{ProductDetail, ProductPage, ProductSummary, Sku};
use crate::domain::order::OrderPage;

use super::fixtures::{find_product, resolve_sku, FIXTURE_PRODUCTS};
use super::state::IsolatedMockState;

/// Resolve a SKU and overlay any stored price-tier override, so tiers
/// observed earlier in the session win over fixture or synthesized ones.
pub fn sku_for(state: &IsolatedMockState, sku_id: &str) -> Sku {
    let mut sku = resolve_sku(sku_id);
    if let Some(tiers) = state.sku_price_tiers_by_sku_id.get(sku_id) {
        if !tiers.is_empty() {
            sku.price_tiers = tiers.clone();
        }
    }
    sku
}

pub fn project_cart(state: &IsolatedMockState) -> Cart {
    let lines: Vec<CartLine> = state
        .cart_entries
        .iter()
        .map(|entry| {
            let sku = sku_for(state, &entry.sku_id);
            let line_total_fen = sku.unit_price_for(entry.qty) * entry.qty as i64;
            CartLine { sku, qty: entry.qty, line_total_fen }
        })
        .collect();
    let total_fen = lines.iter().map(|l| l.line_total_fen).sum();
    Cart { lines, total_fen }
}

pub fn project_wishlist(state: &IsolatedMockState) -> Vec<Sku> {
    state
        .wishlist_sku_ids
        .iter()
        .map(|id| sku_for(state, id))
        .collect()
}

pub fn project_product_detail(state: &IsolatedMockState, spu_id: &str) -> Option<ProductDetail> {
    let product = find_product(spu_id)?;
    let mut detail = product.clone();
    for sku in &mut detail.skus {
        if let Some(tiers) = state.sku_price_tiers_by_sku_id.get(&sku.id) {
            if !tiers.is_empty() {
                sku.price_tiers = tiers.clone();
            }
        }
    }
    Some(detail)
}

pub fn project_product_page(keyword: &str, page: u32, page_size: u32) -> ProductPage {
    let needle = keyword.trim().to_lowercase();
    let matched: Vec<&ProductDetail> = FIXTURE_PRODUCTS
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .collect();

    let total = matched.len() as u64;
    let start = (page.saturating_sub(1) * page_size) as usize;
    let items = matched
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .map(|p| ProductSummary {
            spu_id: p.spu_id.clone(),
            name: p.name.clone(),
            cover_image_url: p.main_image_url.clone(),
            min_price_fen: p
                .skus
                .iter()
                .flat_map(|s| s.price_tiers.iter().map(|t| t.unit_price_fen))
                .min()
                .unwrap_or(0),
        })
        .collect();

    ProductPage { items, page, total }
}

/// Orders newest-first, the way the live listing endpoint sorts.
pub fn project_orders_page(state: &IsolatedMockState, page: u32, page_size: u32) -> OrderPage {
    let mut orders = state.orders.clone();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = orders.len() as u64;
    let start = (page.saturating_sub(1) * page_size) as usize;
    let items = orders.into_iter().skip(start).take(page_size as usize).collect();

    OrderPage { items, page, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::SkuPriceTier;
    use crate::mock::state::CartEntry;

    #[test]
    fn cart_projection_resolves_and_totals() {
        let state = IsolatedMockState {
            cart_entries: vec![CartEntry { sku_id: "sku-spu-1004-1".to_string(), qty: 10 }],
            ..Default::default()
        };
        let cart = project_cart(&state);
        assert_eq!(cart.lines.len(), 1);
        // 10 rolls hits the min_qty=10 tier: 450 * 0.9 = 405 fen each.
        assert_eq!(cart.lines[0].line_total_fen, 4050);
        assert_eq!(cart.total_fen, 4050);
    }

    #[test]
    fn tier_override_wins_over_fixture() {
        let mut state = IsolatedMockState::default();
        state.sku_price_tiers_by_sku_id.insert(
            "sku-spu-1004-1".to_string(),
            vec![SkuPriceTier { min_qty: 1, unit_price_fen: 999 }],
        );
        let sku = sku_for(&state, "sku-spu-1004-1");
        assert_eq!(sku.price_tiers.len(), 1);
        assert_eq!(sku.price_tiers[0].unit_price_fen, 999);
    }

    #[test]
    fn unknown_spu_projects_to_none() {
        let state = IsolatedMockState::default();
        assert!(project_product_detail(&state, "spu-9999").is_none());
    }

    #[test]
    fn product_page_filters_by_keyword() {
        let page = project_product_page("paper", 1, 20);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].spu_id, "spu-1002");

        let all = project_product_page("", 1, 2);
        assert_eq!(all.items.len(), 2);
        assert_eq!(all.total, FIXTURE_PRODUCTS.len() as u64);
    }
}
