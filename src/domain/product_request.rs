use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductRequestStatus {
    Pending,
    Sourced,
    Rejected,
}

/// "We need this but you don't stock it" submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRequest {
    pub id: String,
    pub name: String,
    pub spec_note: String,
    pub qty: u32,
    pub status: ProductRequestStatus,
    pub created_at: DateTime<Utc>,
}
