use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MessageAuthor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    Open,
    Answered,
    Closed,
}

/// Pre-sale price/availability question, optionally tied to a SKU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub sku_id: Option<String>,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryMessage {
    pub id: String,
    pub inquiry_id: String,
    pub author: MessageAuthor,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}
