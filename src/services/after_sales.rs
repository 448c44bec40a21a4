use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::domain::after_sales::{AfterSalesTicket, TicketMessage, TicketStatus};
use crate::domain::MessageAuthor;
use crate::error::Result;
use crate::types::RequestDescriptor;

use super::{decode, mock_api_error, CoreContext};

/// After-sales tickets and their message threads.
pub struct AfterSalesService {
    ctx: Arc<CoreContext>,
}

impl AfterSalesService {
    pub fn new(ctx: Arc<CoreContext>) -> Self {
        Self { ctx }
    }

    pub async fn list_tickets(&self) -> Result<Vec<AfterSalesTicket>> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            let mut tickets = state.after_sales_tickets;
            tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            return Ok(tickets);
        }
        let descriptor = RequestDescriptor::get(self.ctx.commerce_url("/after-sales/tickets"));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn create_ticket(&self, order_id: &str, reason: &str) -> Result<AfterSalesTicket> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            if !state.orders.iter().any(|o| o.id == order_id) {
                return Err(mock_api_error(404, "ORDER_NOT_FOUND", "order does not exist"));
            }

            let now = Utc::now();
            let ticket = AfterSalesTicket {
                id: format!("tkt-{}", Uuid::new_v4().simple()),
                order_id: order_id.to_string(),
                reason: reason.to_string(),
                status: TicketStatus::Open,
                created_at: now,
                updated_at: now,
            };
            let stored = ticket.clone();
            self.ctx
                .mock
                .update(move |mut s| {
                    s.after_sales_messages_by_ticket_id
                        .insert(stored.id.clone(), Vec::new());
                    s.after_sales_tickets.push(stored.clone());
                    s
                })
                .await;
            return Ok(ticket);
        }

        let descriptor = RequestDescriptor::post(
            self.ctx.commerce_url("/after-sales/tickets"),
            json!({ "orderId": order_id, "reason": reason }),
        );
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn get_messages(&self, ticket_id: &str) -> Result<Vec<TicketMessage>> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            if !state.after_sales_tickets.iter().any(|t| t.id == ticket_id) {
                return Err(mock_api_error(404, "TICKET_NOT_FOUND", "ticket does not exist"));
            }
            return Ok(state
                .after_sales_messages_by_ticket_id
                .get(ticket_id)
                .cloned()
                .unwrap_or_default());
        }
        let descriptor = RequestDescriptor::get(
            self.ctx.commerce_url(&format!("/after-sales/tickets/{}/messages", ticket_id)),
        );
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn post_message(&self, ticket_id: &str, body: &str) -> Result<TicketMessage> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            if !state.after_sales_tickets.iter().any(|t| t.id == ticket_id) {
                return Err(mock_api_error(404, "TICKET_NOT_FOUND", "ticket does not exist"));
            }

            let now = Utc::now();
            let message = TicketMessage {
                id: format!("msg-{}", Uuid::new_v4().simple()),
                ticket_id: ticket_id.to_string(),
                author: MessageAuthor::Buyer,
                body: body.to_string(),
                sent_at: now,
            };
            let stored = message.clone();
            let target = ticket_id.to_string();
            self.ctx
                .mock
                .update(move |mut s| {
                    s.after_sales_messages_by_ticket_id
                        .entry(target.clone())
                        .or_default()
                        .push(stored.clone());
                    if let Some(ticket) = s.after_sales_tickets.iter_mut().find(|t| t.id == target) {
                        ticket.updated_at = now;
                    }
                    s
                })
                .await;
            return Ok(message);
        }

        let descriptor = RequestDescriptor::post(
            self.ctx.commerce_url(&format!("/after-sales/tickets/{}/messages", ticket_id)),
            json!({ "body": body }),
        );
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }
}
