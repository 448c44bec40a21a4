use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::domain::cart::Cart;
use crate::error::Result;
use crate::mock::projections::project_cart;
use crate::mock::CartEntry;
use crate::types::RequestDescriptor;

use super::{decode, CoreContext};

pub struct CartService {
    ctx: Arc<CoreContext>,
}

impl CartService {
    pub fn new(ctx: Arc<CoreContext>) -> Self {
        Self { ctx }
    }

    pub async fn get_cart(&self) -> Result<Cart> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            return Ok(project_cart(&state));
        }
        let descriptor = RequestDescriptor::get(self.ctx.commerce_url("/cart"));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    /// Merge-or-append: an existing line for the SKU accumulates quantity.
    pub async fn add_item(&self, sku_id: &str, qty: u32) -> Result<Cart> {
        if self.ctx.offline() {
            let sku_id = sku_id.to_string();
            let qty = qty.max(1);
            let state = self
                .ctx
                .mock
                .update(move |mut s| {
                    match s.cart_entries.iter().position(|e| e.sku_id == sku_id) {
                        Some(i) => s.cart_entries[i].qty = s.cart_entries[i].qty.saturating_add(qty),
                        None => s.cart_entries.push(CartEntry { sku_id, qty }),
                    }
                    s
                })
                .await;
            return Ok(project_cart(&state));
        }

        let descriptor = RequestDescriptor::post(
            self.ctx.commerce_url("/cart/items"),
            json!({ "skuId": sku_id, "qty": qty }),
        );
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    /// Set an exact quantity; an absent line is created.
    pub async fn update_qty(&self, sku_id: &str, qty: u32) -> Result<Cart> {
        if self.ctx.offline() {
            let sku_id = sku_id.to_string();
            let qty = qty.max(1);
            let state = self
                .ctx
                .mock
                .update(move |mut s| {
                    match s.cart_entries.iter().position(|e| e.sku_id == sku_id) {
                        Some(i) => s.cart_entries[i].qty = qty,
                        None => s.cart_entries.push(CartEntry { sku_id, qty }),
                    }
                    s
                })
                .await;
            return Ok(project_cart(&state));
        }

        let mut descriptor = RequestDescriptor::new(
            crate::types::HttpMethod::Put,
            self.ctx.commerce_url(&format!("/cart/items/{}", sku_id)),
        );
        descriptor.body = crate::types::RequestBody::Json(json!({ "qty": qty }));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn remove_item(&self, sku_id: &str) -> Result<Cart> {
        if self.ctx.offline() {
            let sku_id = sku_id.to_string();
            let state = self
                .ctx
                .mock
                .update(move |mut s| {
                    s.cart_entries.retain(|e| e.sku_id != sku_id);
                    s
                })
                .await;
            return Ok(project_cart(&state));
        }

        let descriptor =
            RequestDescriptor::delete(self.ctx.commerce_url(&format!("/cart/items/{}", sku_id)));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn clear(&self) -> Result<Cart> {
        if self.ctx.offline() {
            debug!("clearing offline cart");
            let state = self
                .ctx
                .mock
                .update(|mut s| {
                    s.cart_entries.clear();
                    s
                })
                .await;
            return Ok(project_cart(&state));
        }

        let descriptor = RequestDescriptor::delete(self.ctx.commerce_url("/cart"));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }
}
