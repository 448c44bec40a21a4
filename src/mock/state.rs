use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::after_sales::{AfterSalesTicket, TicketMessage};
use crate::domain::catalog::SkuPriceTier;
use crate::domain::inquiry::{Inquiry, InquiryMessage};
use crate::domain::order::Order;
use crate::domain::product_request::ProductRequest;
use crate::domain::tracking::TrackingInfo;
use crate::domain::Address;

/// One line of the offline cart. Quantity is always a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub sku_id: String,
    pub qty: u32,
}

/// The offline backend's single source of truth, persisted as one JSON
/// document. Mutated only through the runtime's reducer path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolatedMockState {
    pub wishlist_sku_ids: Vec<String>,
    pub cart_entries: Vec<CartEntry>,
    pub sku_price_tiers_by_sku_id: BTreeMap<String, Vec<SkuPriceTier>>,
    pub orders: Vec<Order>,
    pub tracking_by_order_id: BTreeMap<String, TrackingInfo>,
    pub product_requests: Vec<ProductRequest>,
    pub after_sales_tickets: Vec<AfterSalesTicket>,
    pub after_sales_messages_by_ticket_id: BTreeMap<String, Vec<TicketMessage>>,
    pub inquiries: Vec<Inquiry>,
    pub inquiry_messages_by_inquiry_id: BTreeMap<String, Vec<InquiryMessage>>,
    pub addresses: Vec<Address>,
    pub updated_at: DateTime<Utc>,
}

impl Default for IsolatedMockState {
    fn default() -> Self {
        Self {
            wishlist_sku_ids: Vec::new(),
            cart_entries: Vec::new(),
            sku_price_tiers_by_sku_id: BTreeMap::new(),
            orders: Vec::new(),
            tracking_by_order_id: BTreeMap::new(),
            product_requests: Vec::new(),
            after_sales_tickets: Vec::new(),
            after_sales_messages_by_ticket_id: BTreeMap::new(),
            inquiries: Vec::new(),
            inquiry_messages_by_inquiry_id: BTreeMap::new(),
            addresses: Vec::new(),
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

impl IsolatedMockState {
    /// Rebuild a valid state from whatever was persisted. Every field is
    /// normalized independently; a corrupted blob degrades per field to
    /// defaults instead of rejecting the whole document.
    pub fn from_persisted(raw: Option<&str>) -> Self {
        let value = match raw {
            Some(text) => match serde_json::from_str::<Value>(text) {
                Ok(value) => value,
                Err(e) => {
                    debug!(error = %e, "persisted mock state unparseable, using defaults");
                    return Self::default();
                }
            },
            None => return Self::default(),
        };

        let Value::Object(fields) = value else {
            debug!("persisted mock state is not an object, using defaults");
            return Self::default();
        };

        let state = Self {
            wishlist_sku_ids: vec_field(&fields, "wishlist_sku_ids"),
            cart_entries: cart_entries_field(&fields),
            sku_price_tiers_by_sku_id: map_field(&fields, "sku_price_tiers_by_sku_id"),
            orders: vec_field(&fields, "orders"),
            tracking_by_order_id: map_field(&fields, "tracking_by_order_id"),
            product_requests: vec_field(&fields, "product_requests"),
            after_sales_tickets: vec_field(&fields, "after_sales_tickets"),
            after_sales_messages_by_ticket_id: map_field(&fields, "after_sales_messages_by_ticket_id"),
            inquiries: vec_field(&fields, "inquiries"),
            inquiry_messages_by_inquiry_id: map_field(&fields, "inquiry_messages_by_inquiry_id"),
            addresses: vec_field(&fields, "addresses"),
            updated_at: fields
                .get("updated_at")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or(DateTime::UNIX_EPOCH),
        };
        state.sanitized()
    }

    /// Enforce the snapshot invariants on an in-memory state. Reducers run
    /// through this before persisting, so a reducer returning a shape that
    /// only looks valid cannot poison the store.
    pub fn sanitized(mut self) -> Self {
        let mut seen = std::collections::HashSet::new();
        self.wishlist_sku_ids.retain(|id| !id.is_empty() && seen.insert(id.clone()));

        let mut merged: Vec<CartEntry> = Vec::new();
        for entry in self.cart_entries.drain(..) {
            if entry.sku_id.is_empty() {
                continue;
            }
            let qty = entry.qty.max(1);
            match merged.iter().position(|e| e.sku_id == entry.sku_id) {
                Some(i) => merged[i].qty = merged[i].qty.saturating_add(qty),
                None => merged.push(CartEntry { sku_id: entry.sku_id, qty }),
            }
        }
        self.cart_entries = merged;
        self
    }
}

/// Collapse an arbitrary JSON quantity into a positive integer: truncation
/// first, then anything non-finite or non-positive becomes 1.
pub fn normalize_qty(value: f64) -> u32 {
    if !value.is_finite() {
        return 1;
    }
    let truncated = value.trunc();
    if truncated < 1.0 {
        1
    } else if truncated > u32::MAX as f64 {
        u32::MAX
    } else {
        truncated as u32
    }
}

/// Deserialize an array field element by element, dropping malformed
/// entries instead of rejecting the array.
fn vec_field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Vec<T> {
    match fields.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Same element-wise tolerance for keyed collections.
fn map_field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> BTreeMap<String, T> {
    match fields.get(key) {
        Some(Value::Object(entries)) => entries
            .iter()
            .filter_map(|(k, v)| {
                serde_json::from_value(v.clone())
                    .ok()
                    .map(|parsed| (k.clone(), parsed))
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// Cart entries need quantity coercion, not just tolerant deserialization:
/// a fractional or negative qty from a stale blob still has a usable SKU.
fn cart_entries_field(fields: &Map<String, Value>) -> Vec<CartEntry> {
    match fields.get("cart_entries") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let sku_id = item.get("sku_id")?.as_str()?.to_string();
                if sku_id.is_empty() {
                    return None;
                }
                let qty = item.get("qty").and_then(Value::as_f64).map(normalize_qty).unwrap_or(1);
                Some(CartEntry { sku_id, qty })
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_blob_yields_defaults() {
        let state = IsolatedMockState::from_persisted(None);
        assert!(state.cart_entries.is_empty());
        assert!(state.orders.is_empty());
        assert_eq!(state.updated_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn garbage_blob_yields_defaults() {
        let state = IsolatedMockState::from_persisted(Some("{not json"));
        assert!(state.wishlist_sku_ids.is_empty());
        let state = IsolatedMockState::from_persisted(Some("[1,2,3]"));
        assert!(state.cart_entries.is_empty());
    }

    #[test]
    fn fields_degrade_independently() {
        let blob = json!({
            "wishlist_sku_ids": ["sku-a", 42, "sku-b", "sku-a"],
            "cart_entries": [
                { "sku_id": "sku-a", "qty": 2.9 },
                { "sku_id": "sku-b", "qty": -4 },
                { "qty": 3 },
                { "sku_id": "sku-c" }
            ],
            "orders": "definitely not a list",
            "updated_at": "not a timestamp"
        })
        .to_string();

        let state = IsolatedMockState::from_persisted(Some(&blob));
        assert_eq!(state.wishlist_sku_ids, vec!["sku-a", "sku-b"]);
        assert_eq!(
            state.cart_entries,
            vec![
                CartEntry { sku_id: "sku-a".to_string(), qty: 2 },
                CartEntry { sku_id: "sku-b".to_string(), qty: 1 },
                CartEntry { sku_id: "sku-c".to_string(), qty: 1 },
            ]
        );
        assert!(state.orders.is_empty());
        assert_eq!(state.updated_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn qty_normalization_rules() {
        assert_eq!(normalize_qty(5.0), 5);
        assert_eq!(normalize_qty(2.7), 2);
        assert_eq!(normalize_qty(0.5), 1);
        assert_eq!(normalize_qty(0.0), 1);
        assert_eq!(normalize_qty(-3.0), 1);
        assert_eq!(normalize_qty(f64::NAN), 1);
        assert_eq!(normalize_qty(f64::INFINITY), 1);
    }

    #[test]
    fn sanitize_merges_duplicate_cart_entries() {
        let state = IsolatedMockState {
            cart_entries: vec![
                CartEntry { sku_id: "sku-a".to_string(), qty: 2 },
                CartEntry { sku_id: "sku-a".to_string(), qty: 3 },
            ],
            ..Default::default()
        }
        .sanitized();
        assert_eq!(state.cart_entries.len(), 1);
        assert_eq!(state.cart_entries[0].qty, 5);
    }
}
