use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::domain::Address;
use crate::error::Result;
use crate::types::RequestDescriptor;

use super::{decode, mock_api_error, CoreContext};

pub struct AddressService {
    ctx: Arc<CoreContext>,
}

impl AddressService {
    pub fn new(ctx: Arc<CoreContext>) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> Result<Vec<Address>> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            return Ok(state.addresses);
        }
        let descriptor = RequestDescriptor::get(self.ctx.commerce_url("/addresses"));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    /// Upsert by id; a missing id creates. Marking one address default
    /// clears the flag everywhere else.
    pub async fn save(&self, mut address: Address) -> Result<Address> {
        if self.ctx.offline() {
            if address.id.is_none() {
                address.id = Some(format!("adr-{}", Uuid::new_v4().simple()));
            }
            let stored = address.clone();
            self.ctx
                .mock
                .update(move |mut s| {
                    if stored.is_default {
                        for existing in &mut s.addresses {
                            existing.is_default = false;
                        }
                    }
                    match s.addresses.iter().position(|a| a.id == stored.id) {
                        Some(i) => s.addresses[i] = stored.clone(),
                        None => s.addresses.push(stored.clone()),
                    }
                    s
                })
                .await;
            return Ok(address);
        }

        let descriptor =
            RequestDescriptor::post(self.ctx.commerce_url("/addresses"), json!(address));
        decode(self.ctx.requester.dispatch(descriptor).await?)
    }

    pub async fn delete(&self, address_id: &str) -> Result<()> {
        if self.ctx.offline() {
            let state = self.ctx.mock.load().await;
            if !state.addresses.iter().any(|a| a.id.as_deref() == Some(address_id)) {
                return Err(mock_api_error(404, "ADDRESS_NOT_FOUND", "address does not exist"));
            }
            let target = address_id.to_string();
            self.ctx
                .mock
                .update(move |mut s| {
                    s.addresses.retain(|a| a.id.as_deref() != Some(target.as_str()));
                    s
                })
                .await;
            return Ok(());
        }

        let descriptor =
            RequestDescriptor::delete(self.ctx.commerce_url(&format!("/addresses/{}", address_id)));
        self.ctx.requester.dispatch(descriptor).await?;
        Ok(())
    }
}
