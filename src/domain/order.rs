use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::Sku;
use super::Address;

/// Backend-owned lifecycle; this client stores and reports statuses, it
/// does not drive the transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Submitted,
    Confirmed,
    Shipped,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub sku: Sku,
    pub qty: u32,
    pub unit_price_fen: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    pub address: Address,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn total_fen(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.unit_price_fen * item.qty as i64)
            .sum()
    }
}

/// What the buyer is about to submit. The idempotency fingerprint is
/// derived from this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftItem {
    pub sku_id: String,
    pub qty: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<DraftItem>,
    pub address: Address,
    #[serde(default)]
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub items: Vec<Order>,
    pub page: u32,
    pub total: u64,
}
