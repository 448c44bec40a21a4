use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::types::RequestDescriptor;

use super::{decode, CoreContext};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
}

/// Login/logout over the identity backend, or a local session when the
/// runtime is isolated.
pub struct AuthService {
    ctx: Arc<CoreContext>,
}

impl AuthService {
    pub fn new(ctx: Arc<CoreContext>) -> Self {
        Self { ctx }
    }

    /// Platform login primitive → credential code → identity exchange →
    /// stored bearer token.
    pub async fn login(&self) -> Result<Session> {
        if self.ctx.offline() {
            let session = Session { token: format!("offline-session-{}", Uuid::new_v4()) };
            self.ctx.tokens.set_token(Some(session.token.clone())).await;
            info!("offline session opened");
            return Ok(session);
        }

        let credential = self.ctx.adapter.login().await?;
        let descriptor = RequestDescriptor::post(
            self.ctx.identity_url("/auth/sessions"),
            json!({ "code": credential.code }),
        );
        let session: Session = decode(self.ctx.requester.dispatch(descriptor).await?)?;
        self.ctx.tokens.set_token(Some(session.token.clone())).await;
        info!("session opened");
        Ok(session)
    }

    /// Exhaustive logout: primary and legacy token keys both go.
    pub async fn logout(&self) -> Result<()> {
        if !self.ctx.offline() {
            // Best-effort server-side invalidation; the local clear below
            // is what actually ends the session for this client.
            let descriptor =
                RequestDescriptor::delete(self.ctx.identity_url("/auth/sessions/current"));
            let _ = self.ctx.requester.dispatch(descriptor).await;
        }
        self.ctx.tokens.set_token(None).await;
        info!("session closed");
        Ok(())
    }
}
