use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MessageAuthor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfterSalesTicket {
    pub id: String,
    pub order_id: String,
    pub reason: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketMessage {
    pub id: String,
    pub ticket_id: String,
    pub author: MessageAuthor,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}
