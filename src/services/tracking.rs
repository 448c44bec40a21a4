use std::sync::Arc;

use crate::domain::tracking::TrackingInfo;
use crate::error::Result;
use crate::types::RequestDescriptor;

use super::{decode, mock_api_error, CoreContext};

pub struct TrackingService {
    ctx: Arc<CoreContext>,
}

impl TrackingService {
    pub fn new(ctx: Arc<CoreContext>) -> Self {
        Self { ctx }
    }

    pub async fn get_tracking(&self, order_id: &str) -> Result<TrackingInfo> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            return state
                .tracking_by_order_id
                .get(order_id)
                .cloned()
                .ok_or_else(|| {
                    mock_api_error(404, "TRACKING_NOT_FOUND", "no tracking for this order")
                });
        }
        let descriptor = RequestDescriptor::get(
            self.ctx.commerce_url(&format!("/orders/{}/tracking", order_id)),
        );
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }
}
