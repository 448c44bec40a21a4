use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::constants::IDEMPOTENCY_HEADER;
use crate::domain::order::{Order, OrderDraft, OrderItem, OrderPage, OrderStatus};
use crate::domain::tracking::{TrackingEvent, TrackingInfo};
use crate::error::Result;
use crate::idempotency::IdempotencyKeyManager;
use crate::mock::projections::{project_orders_page, sku_for};
use crate::types::RequestDescriptor;

use super::{decode, mock_api_error, CoreContext, DEFAULT_PAGE_SIZE};

/// Order submission and reads. Submission is the one mutation whose retry
/// safety matters most, so it carries the idempotency key; the manager is
/// reset only on a terminal outcome.
pub struct OrderService {
    ctx: Arc<CoreContext>,
    keys: IdempotencyKeyManager,
}

impl OrderService {
    pub fn new(ctx: Arc<CoreContext>) -> Self {
        Self { ctx, keys: IdempotencyKeyManager::new() }
    }

    pub async fn submit(&self, draft: OrderDraft) -> Result<Order> {
        if draft.items.is_empty() {
            return Err(mock_api_error(422, "ORDER_EMPTY", "order has no items"));
        }

        let key = self.keys.key_for(&draft);

        let order = if self.ctx.offline() {
            self.mock_submit(&draft).await?
        } else {
            let descriptor = RequestDescriptor::post(
                self.ctx.commerce_url("/orders"),
                json!({
                    "items": draft.items,
                    "address": draft.address,
                    "remark": draft.remark,
                }),
            )
            .with_header(IDEMPOTENCY_HEADER, key);
            decode(self.ctx.requester.dispatch(descriptor).await?)?
        };

        // Terminal success: the next draft must mint a fresh key even if
        // its fingerprint happens to collide.
        self.keys.reset();
        info!(order_id = %order.id, "order submitted");
        Ok(order)
    }

    /// Abandoning a draft is also terminal for its key.
    pub fn abandon_draft(&self) {
        self.keys.reset();
    }

    pub async fn list_orders(&self, page: u32) -> Result<OrderPage> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            return Ok(project_orders_page(&state, page, DEFAULT_PAGE_SIZE));
        }
        let descriptor =
            RequestDescriptor::get(self.ctx.commerce_url(&format!("/orders?page={}", page)));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            return state
                .orders
                .iter()
                .find(|o| o.id == order_id)
                .cloned()
                .ok_or_else(|| mock_api_error(404, "ORDER_NOT_FOUND", "order does not exist"));
        }
        let descriptor =
            RequestDescriptor::get(self.ctx.commerce_url(&format!("/orders/{}", order_id)));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn cancel(&self, order_id: &str) -> Result<Order> {
        if self.ctx.offline() {
            return self.mock_cancel(order_id).await;
        }
        let descriptor = RequestDescriptor::post(
            self.ctx.commerce_url(&format!("/orders/{}/cancel", order_id)),
            json!({}),
        );
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    /// Offline submission: append the order, seed its tracking timeline,
    /// and consume the ordered SKUs out of the cart, all in one reducer so
    /// a reload mid-way can never observe half the effect.
    async fn mock_submit(&self, draft: &OrderDraft) -> Result<Order> {
        let now = Utc::now();
        let order_id = format!("ord-{}", Uuid::new_v4().simple());

        let state_before = self.ctx.mock.load().await;
        let items: Vec<OrderItem> = draft
            .items
            .iter()
            .map(|line| {
                let qty = line.qty.max(1);
                let sku = sku_for(&state_before, &line.sku_id);
                let unit_price_fen = sku.unit_price_for(qty);
                OrderItem { sku, qty, unit_price_fen }
            })
            .collect();

        let order = Order {
            id: order_id.clone(),
            status: OrderStatus::Submitted,
            address: draft.address.clone(),
            items,
            remark: draft.remark.clone(),
            created_at: now,
            updated_at: now,
        };

        let ordered_ids: Vec<String> = draft.items.iter().map(|i| i.sku_id.clone()).collect();
        let stored = order.clone();
        self.ctx
            .mock
            .update(move |mut s| {
                s.orders.push(stored.clone());
                s.tracking_by_order_id.insert(
                    stored.id.clone(),
                    TrackingInfo {
                        order_id: stored.id.clone(),
                        carrier: None,
                        tracking_no: None,
                        events: vec![TrackingEvent {
                            description: "Order submitted".to_string(),
                            occurred_at: now,
                        }],
                    },
                );
                s.cart_entries.retain(|e| !ordered_ids.contains(&e.sku_id));
                s
            })
            .await;

        Ok(order)
    }

    async fn mock_cancel(&self, order_id: &str) -> Result<Order> {
        let state = self.ctx.mock.load().await;
        let order = state
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
            .ok_or_else(|| mock_api_error(404, "ORDER_NOT_FOUND", "order does not exist"))?;

        if !matches!(order.status, OrderStatus::Submitted | OrderStatus::Confirmed) {
            return Err(mock_api_error(
                409,
                "ORDER_NOT_CANCELLABLE",
                "order can no longer be cancelled",
            ));
        }

        let now = Utc::now();
        let target = order_id.to_string();
        let state = self
            .ctx
            .mock
            .update(move |mut s| {
                if let Some(stored) = s.orders.iter_mut().find(|o| o.id == target) {
                    stored.status = OrderStatus::Cancelled;
                    stored.updated_at = now;
                }
                if let Some(tracking) = s.tracking_by_order_id.get_mut(&target) {
                    tracking.events.push(TrackingEvent {
                        description: "Order cancelled".to_string(),
                        occurred_at: now,
                    });
                }
                s
            })
            .await;

        state
            .orders
            .into_iter()
            .find(|o| o.id == order_id)
            .ok_or_else(|| mock_api_error(404, "ORDER_NOT_FOUND", "order does not exist"))
    }
}
