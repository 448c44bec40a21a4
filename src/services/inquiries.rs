use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::domain::inquiry::{Inquiry, InquiryMessage, InquiryStatus};
use crate::domain::MessageAuthor;
use crate::error::Result;
use crate::types::RequestDescriptor;

use super::{decode, mock_api_error, CoreContext};

/// Pre-sale inquiries and their message threads.
pub struct InquiryService {
    ctx: Arc<CoreContext>,
}

impl InquiryService {
    pub fn new(ctx: Arc<CoreContext>) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> Result<Vec<Inquiry>> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            let mut inquiries = state.inquiries;
            inquiries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            return Ok(inquiries);
        }
        let descriptor = RequestDescriptor::get(self.ctx.commerce_url("/inquiries"));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn create(&self, subject: &str, sku_id: Option<&str>) -> Result<Inquiry> {
        if self.ctx.offline() {
            let inquiry = Inquiry {
                id: format!("inq-{}", Uuid::new_v4().simple()),
                subject: subject.to_string(),
                sku_id: sku_id.map(str::to_string),
                status: InquiryStatus::Open,
                created_at: Utc::now(),
            };
            let stored = inquiry.clone();
            self.ctx
                .mock
                .update(move |mut s| {
                    s.inquiry_messages_by_inquiry_id
                        .insert(stored.id.clone(), Vec::new());
                    s.inquiries.push(stored.clone());
                    s
                })
                .await;
            return Ok(inquiry);
        }

        let descriptor = RequestDescriptor::post(
            self.ctx.commerce_url("/inquiries"),
            json!({ "subject": subject, "skuId": sku_id }),
        );
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn get_messages(&self, inquiry_id: &str) -> Result<Vec<InquiryMessage>> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            if !state.inquiries.iter().any(|i| i.id == inquiry_id) {
                return Err(mock_api_error(404, "INQUIRY_NOT_FOUND", "inquiry does not exist"));
            }
            return Ok(state
                .inquiry_messages_by_inquiry_id
                .get(inquiry_id)
                .cloned()
                .unwrap_or_default());
        }
        let descriptor = RequestDescriptor::get(
            self.ctx.commerce_url(&format!("/inquiries/{}/messages", inquiry_id)),
        );
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn post_message(&self, inquiry_id: &str, body: &str) -> Result<InquiryMessage> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            if !state.inquiries.iter().any(|i| i.id == inquiry_id) {
                return Err(mock_api_error(404, "INQUIRY_NOT_FOUND", "inquiry does not exist"));
            }

            let message = InquiryMessage {
                id: format!("msg-{}", Uuid::new_v4().simple()),
                inquiry_id: inquiry_id.to_string(),
                author: MessageAuthor::Buyer,
                body: body.to_string(),
                sent_at: Utc::now(),
            };
            let stored = message.clone();
            let target = inquiry_id.to_string();
            self.ctx
                .mock
                .update(move |mut s| {
                    s.inquiry_messages_by_inquiry_id
                        .entry(target.clone())
                        .or_default()
                        .push(stored.clone());
                    s
                })
                .await;
            return Ok(message);
        }

        let descriptor = RequestDescriptor::post(
            self.ctx.commerce_url(&format!("/inquiries/{}/messages", inquiry_id)),
            json!({ "body": body }),
        );
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }
}
