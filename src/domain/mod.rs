//! Record types shared by the live facades and the mock runtime.
//!
//! Both paths must yield these exact shapes; the UI layer cannot tell the
//! backends apart.

pub mod after_sales;
pub mod catalog;
pub mod cart;
pub mod inquiry;
pub mod order;
pub mod product_request;
pub mod tracking;

use serde::{Deserialize, Serialize};

/// Who wrote a thread message, for after-sales and inquiry threads alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageAuthor {
    Buyer,
    Agent,
}

/// Shipping address attached to orders. Field order is part of the order
/// fingerprint's canonical serialization, so keep it stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub id: Option<String>,
    pub contact_name: String,
    pub phone: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub detail: String,
    #[serde(default)]
    pub is_default: bool,
}
