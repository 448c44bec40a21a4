use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::constants::{
    AUTHORIZATION_HEADER, CONTENT_TYPE_HEADER, CONTENT_TYPE_JSON, REQUEST_ID_HEADER,
};
use crate::error::{ApiError, Result, RuntimeError};
use crate::transport::TransportAdapter;
use crate::types::{RawResponse, RequestDescriptor, ResponseEnvelope};

/// Turns a generic request description into a transport call and a
/// normalized response or `ApiError`.
///
/// The requester does exactly one dispatch: it never retries and never
/// mutates the token store. Retry and 401 recovery belong to the layers
/// above it.
pub struct Requester {
    adapter: Arc<dyn TransportAdapter>,
    tokens: Arc<TokenStore>,
}

impl Requester {
    pub fn new(adapter: Arc<dyn TransportAdapter>, tokens: Arc<TokenStore>) -> Self {
        Self { adapter, tokens }
    }

    pub async fn dispatch(&self, descriptor: RequestDescriptor) -> Result<ResponseEnvelope<Value>> {
        let descriptor = self.prepare(descriptor).await;

        debug!(method = descriptor.method.as_str(), url = %descriptor.url, "request");
        let raw = self.adapter.request(&descriptor).await?;
        Self::classify(raw)
    }

    /// Header merge and auth injection, in the order the contract fixes:
    /// adapter extras first, caller headers over them, then the bearer
    /// token and a JSON content-type default.
    async fn prepare(&self, descriptor: RequestDescriptor) -> RequestDescriptor {
        let mut merged = self.adapter.extra_headers();
        merged.extend(descriptor.headers.clone());

        let mut descriptor = RequestDescriptor { headers: merged, ..descriptor };

        if descriptor.header(AUTHORIZATION_HEADER).is_none() {
            if let Some(token) = self.tokens.get_token().await {
                descriptor
                    .headers
                    .insert(AUTHORIZATION_HEADER.to_string(), format!("Bearer {}", token));
            }
        }

        if !descriptor.body.is_none() && descriptor.header(CONTENT_TYPE_HEADER).is_none() {
            // Form bodies get their content type from the transport layer.
            if !matches!(descriptor.body, crate::types::RequestBody::Form(_)) {
                descriptor
                    .headers
                    .insert(CONTENT_TYPE_HEADER.to_string(), CONTENT_TYPE_JSON.to_string());
            }
        }

        descriptor
    }

    /// Status classification: 2xx becomes a success envelope, anything
    /// else is normalized into a single `ApiError` shape.
    fn classify(raw: RawResponse) -> Result<ResponseEnvelope<Value>> {
        let parsed = parse_body(&raw.body);

        if (200..300).contains(&raw.status) {
            return Ok(ResponseEnvelope {
                data: parsed,
                status: raw.status,
                headers: raw.headers,
            });
        }

        let error = normalize_error(&raw, parsed);
        warn!(status = raw.status, message = %error.message, "request failed");
        Err(RuntimeError::Api(error))
    }
}

/// Bodies arrive as opaque strings; anything that looks like JSON is
/// parsed, everything else passes through unchanged.
fn parse_body(body: &str) -> Value {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str(body) {
            Ok(value) => return value,
            Err(e) => debug!(error = %e, "body looked like JSON but did not parse"),
        }
    }
    Value::String(body.to_string())
}

/// Best-effort extraction of the backend error envelope, falling back to
/// a header-derived request id and a generic message.
fn normalize_error(raw: &RawResponse, parsed: Value) -> ApiError {
    let mut error = ApiError::new(raw.status, format!("Request failed with status {}", raw.status));

    if let Value::Object(ref fields) = parsed {
        if let Some(message) = fields.get("message").and_then(Value::as_str) {
            error.message = message.to_string();
        }
        error.code = fields
            .get("code")
            .filter(|c| !c.is_null())
            .map(|c| match c {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        error.request_id = fields
            .get("requestId")
            .and_then(Value::as_str)
            .map(str::to_string);
        error.details = fields.get("details").cloned();
        error.raw = Some(parsed.clone());
    } else if let Value::String(ref s) = parsed {
        if !s.is_empty() {
            error.raw = Some(parsed.clone());
        }
    }

    if error.request_id.is_none() {
        error.request_id = raw.header(REQUEST_ID_HEADER).map(str::to_string);
    }

    error
}
