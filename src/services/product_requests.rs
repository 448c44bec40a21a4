use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::domain::product_request::{ProductRequest, ProductRequestStatus};
use crate::error::Result;
use crate::types::RequestDescriptor;

use super::{decode, CoreContext};

/// "Source this for us" requests for items not in the catalog.
pub struct ProductRequestService {
    ctx: Arc<CoreContext>,
}

impl ProductRequestService {
    pub fn new(ctx: Arc<CoreContext>) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> Result<Vec<ProductRequest>> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            let mut requests = state.product_requests;
            requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            return Ok(requests);
        }
        let descriptor = RequestDescriptor::get(self.ctx.commerce_url("/product-requests"));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn submit(&self, name: &str, spec_note: &str, qty: u32) -> Result<ProductRequest> {
        if self.ctx.offline() {
            let request = ProductRequest {
                id: format!("prq-{}", Uuid::new_v4().simple()),
                name: name.to_string(),
                spec_note: spec_note.to_string(),
                qty: qty.max(1),
                status: ProductRequestStatus::Pending,
                created_at: Utc::now(),
            };
            let stored = request.clone();
            self.ctx
                .mock
                .update(move |mut s| {
                    s.product_requests.push(stored.clone());
                    s
                })
                .await;
            return Ok(request);
        }

        let descriptor = RequestDescriptor::post(
            self.ctx.commerce_url("/product-requests"),
            json!({ "name": name, "specNote": spec_note, "qty": qty }),
        );
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }
}
