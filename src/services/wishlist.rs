use std::sync::Arc;

use serde_json::json;

use crate::domain::catalog::Sku;
use crate::error::Result;
use crate::mock::projections::project_wishlist;
use crate::types::RequestDescriptor;

use super::{decode, CoreContext};

pub struct WishlistService {
    ctx: Arc<CoreContext>,
}

impl WishlistService {
    pub fn new(ctx: Arc<CoreContext>) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> Result<Vec<Sku>> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            return Ok(project_wishlist(&state));
        }
        let descriptor = RequestDescriptor::get(self.ctx.commerce_url("/wishlist"));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn add(&self, sku_id: &str) -> Result<Vec<Sku>> {
        if self.ctx.offline() {
            let sku_id = sku_id.to_string();
            let state = self
                .ctx
                .mock
                .update(move |mut s| {
                    if !s.wishlist_sku_ids.contains(&sku_id) {
                        s.wishlist_sku_ids.push(sku_id);
                    }
                    s
                })
                .await;
            return Ok(project_wishlist(&state));
        }
        let descriptor = RequestDescriptor::post(
            self.ctx.commerce_url("/wishlist"),
            json!({ "skuId": sku_id }),
        );
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn remove(&self, sku_id: &str) -> Result<Vec<Sku>> {
        if self.ctx.offline() {
            let sku_id = sku_id.to_string();
            let state = self
                .ctx
                .mock
                .update(move |mut s| {
                    s.wishlist_sku_ids.retain(|id| *id != sku_id);
                    s
                })
                .await;
            return Ok(project_wishlist(&state));
        }
        let descriptor =
            RequestDescriptor::delete(self.ctx.commerce_url(&format!("/wishlist/{}", sku_id)));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    /// Add when absent, remove when present; returns the resulting list.
    pub async fn toggle(&self, sku_id: &str) -> Result<Vec<Sku>> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            return if state.wishlist_sku_ids.iter().any(|id| id == sku_id) {
                self.remove(sku_id).await
            } else {
                self.add(sku_id).await
            };
        }
        let current = self.list().await?;
        if current.iter().any(|sku| sku.id == sku_id) {
            self.remove(sku_id).await
        } else {
            self.add(sku_id).await
        }
    }
}
