use std::sync::Arc;

use tracing::debug;

use crate::domain::catalog::{ProductDetail, ProductPage};
use crate::error::Result;
use crate::mock::projections;
use crate::retry::{with_retry, RetryOptions};
use crate::types::RequestDescriptor;

use super::{decode, mock_api_error, CoreContext, DEFAULT_PAGE_SIZE};

/// Product reads. These are the only operations wrapped in the retry
/// policy; everything mutating relies on idempotency keys instead.
pub struct CatalogService {
    ctx: Arc<CoreContext>,
}

impl CatalogService {
    pub fn new(ctx: Arc<CoreContext>) -> Self {
        Self { ctx }
    }

    pub async fn get_product_detail(&self, spu_id: &str) -> Result<ProductDetail> {
        if self.ctx.offline() {
            return self.mock_product_detail(spu_id).await;
        }

        let url = self.ctx.gateway_url(&format!("/catalog/products/{}", spu_id));
        let envelope = with_retry(
            || self.ctx.requester.dispatch(RequestDescriptor::get(url.as_str())),
            RetryOptions::default(),
        )
        .await?;
        decode(envelope)
    }

    pub async fn search_products(&self, keyword: &str, page: u32) -> Result<ProductPage> {
        if self.ctx.offline() {
            return Ok(projections::project_product_page(keyword, page, DEFAULT_PAGE_SIZE));
        }

        let url = self.ctx.gateway_url(&format!(
            "/catalog/products?keyword={}&page={}",
            urlencode(keyword),
            page
        ));
        let envelope = with_retry(
            || self.ctx.requester.dispatch(RequestDescriptor::get(url.as_str())),
            RetryOptions::default(),
        )
        .await?;
        decode(envelope)
    }

    /// Offline detail read. Price tiers observed here are pinned into the
    /// snapshot append-only, so repeated fetches of the same SKU can never
    /// drift.
    async fn mock_product_detail(&self, spu_id: &str) -> Result<ProductDetail> {
        let state = self.ctx.mock.load().await;
        let detail = projections::project_product_detail(&state, spu_id)
            .ok_or_else(|| mock_api_error(404, "PRODUCT_NOT_FOUND", "product does not exist"))?;

        let unpinned: Vec<_> = detail
            .skus
            .iter()
            .filter(|sku| !state.sku_price_tiers_by_sku_id.contains_key(&sku.id))
            .cloned()
            .collect();

        if !unpinned.is_empty() {
            debug!(spu_id, count = unpinned.len(), "pinning price tiers");
            self.ctx
                .mock
                .update(move |mut s| {
                    for sku in &unpinned {
                        // Append-only: never replace a stored override.
                        s.sku_price_tiers_by_sku_id
                            .entry(sku.id.clone())
                            .or_insert_with(|| sku.price_tiers.clone());
                    }
                    s
                })
                .await;
        }

        Ok(detail)
    }
}

fn urlencode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
