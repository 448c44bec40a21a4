//! The live-backed and mock-backed facades must expose the same contract:
//! success payloads with the same required fields, failures with the same
//! `ApiError` shape. These tests drive the live pipeline through a scripted
//! transport and compare against the offline runtime.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use procure_client::config::{BackendConfig, RuntimeConfig};
use procure_client::domain::order::{DraftItem, OrderDraft};
use procure_client::error::{Result as RtResult, RuntimeError};
use procure_client::services::{CoreContext, Services};
use procure_client::storage::MemoryKv;
use procure_client::transport::{Platform, TransportAdapter};
use procure_client::types::{
    LoginCredential, PickedFile, RawResponse, RequestDescriptor, UploadRequest,
};
use serde_json::json;

/// Scripted transport: pops canned responses and records every dispatched
/// descriptor for assertions.
struct ScriptedTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    seen: Mutex<Vec<RequestDescriptor>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<RawResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<RequestDescriptor> {
        self.seen.lock().unwrap().clone()
    }
}

fn ok(body: serde_json::Value) -> RawResponse {
    RawResponse { status: 200, headers: HashMap::new(), body: body.to_string() }
}

#[async_trait]
impl TransportAdapter for ScriptedTransport {
    async fn login(&self) -> RtResult<LoginCredential> {
        Ok(LoginCredential { code: "code-abc".to_string() })
    }

    async fn request(&self, descriptor: &RequestDescriptor) -> RtResult<RawResponse> {
        self.seen.lock().unwrap().push(descriptor.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RuntimeError::Transport("script exhausted".to_string()))
    }

    async fn upload_file(&self, _upload: UploadRequest) -> RtResult<RawResponse> {
        Ok(ok(json!({ "url": "https://cdn.example.com/f/1" })))
    }

    async fn choose_image(&self, _count: u8) -> RtResult<Vec<PickedFile>> {
        Ok(vec![])
    }

    async fn choose_file(&self, _count: u8) -> RtResult<Vec<PickedFile>> {
        Ok(vec![])
    }
}

fn live_config() -> RuntimeConfig {
    RuntimeConfig {
        gateway: BackendConfig {
            base_url: "https://gw.example.com".to_string(),
            dev_token: None,
        },
        commerce: BackendConfig {
            base_url: "https://commerce.example.com".to_string(),
            dev_token: None,
        },
        identity: BackendConfig {
            base_url: "https://id.example.com".to_string(),
            dev_token: Some("dev-bearer".to_string()),
        },
        isolated_mock: false,
        state_dir: PathBuf::from("unused"),
        platform: Platform::Wechat,
    }
}

fn live_services(transport: Arc<ScriptedTransport>) -> Services {
    let context = CoreContext::with_kv(live_config(), Some(transport), Arc::new(MemoryKv::new()));
    Services::new(context)
}

fn offline_services() -> Services {
    let config = RuntimeConfig::offline(PathBuf::from("unused"));
    Services::new(CoreContext::with_kv(config, None, Arc::new(MemoryKv::new())))
}

fn sku_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "spu_id": "spu-1001",
        "name": "Nitrile Work Gloves",
        "spec": "Size M / pack of 12",
        "unit": "pack",
        "price_tiers": [{ "min_qty": 1, "unit_price_fen": 2400 }]
    })
}

#[tokio::test]
async fn cart_payloads_match_across_backends() -> Result<()> {
    let transport = ScriptedTransport::new(vec![ok(json!({
        "lines": [{ "sku": sku_json("sku-spu-1001-1"), "qty": 2, "line_total_fen": 4800 }],
        "total_fen": 4800
    }))]);
    let live = live_services(transport.clone());
    let live_cart = live.cart.get_cart().await?;

    let offline = offline_services();
    offline.cart.add_item("sku-spu-1001-1", 2).await?;
    let mock_cart = offline.cart.get_cart().await?;

    // Same structural schema either way.
    assert_eq!(live_cart.lines.len(), mock_cart.lines.len());
    assert_eq!(live_cart.lines[0].sku.id, mock_cart.lines[0].sku.id);
    assert_eq!(live_cart.lines[0].qty, mock_cart.lines[0].qty);
    assert!(mock_cart.total_fen > 0);

    // The dev token flows into the Authorization header.
    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].header("authorization"), Some("Bearer dev-bearer"));
    Ok(())
}

#[tokio::test]
async fn error_shapes_match_across_backends() -> Result<()> {
    let transport = ScriptedTransport::new(vec![RawResponse {
        status: 404,
        headers: HashMap::from([("X-Request-Id".to_string(), "req-5".to_string())]),
        body: json!({ "code": "PRODUCT_NOT_FOUND", "message": "product does not exist" })
            .to_string(),
    }]);
    let live = live_services(transport);
    let live_err = live.catalog.get_product_detail("spu-9999").await.unwrap_err();

    let offline = offline_services();
    let mock_err = offline.catalog.get_product_detail("spu-9999").await.unwrap_err();

    match (live_err, mock_err) {
        (RuntimeError::Api(live_api), RuntimeError::Api(mock_api)) => {
            assert_eq!(live_api.status_code, mock_api.status_code);
            assert_eq!(live_api.code, mock_api.code);
            assert_eq!(live_api.request_id.as_deref(), Some("req-5"));
            assert!(!live_api.message.is_empty() && !mock_api.message.is_empty());
        }
        other => panic!("expected ApiError on both paths, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn order_submission_carries_stable_idempotency_key() -> Result<()> {
    let order_body = json!({
        "id": "ord-1",
        "status": "submitted",
        "address": {
            "contact_name": "R", "phone": "1", "province": "P", "city": "C",
            "district": "D", "detail": "x", "is_default": false
        },
        "items": [{ "sku": sku_json("sku-spu-1001-1"), "qty": 2, "unit_price_fen": 2400 }],
        "created_at": "2026-08-01T08:00:00Z",
        "updated_at": "2026-08-01T08:00:00Z"
    });
    let transport = ScriptedTransport::new(vec![
        RawResponse {
            status: 503,
            headers: HashMap::new(),
            body: json!({ "message": "upstream unavailable" }).to_string(),
        },
        ok(order_body),
    ]);
    let live = live_services(transport.clone());

    let draft = OrderDraft {
        items: vec![DraftItem { sku_id: "sku-spu-1001-1".to_string(), qty: 2 }],
        address: procure_client::domain::Address {
            id: None,
            contact_name: "R".to_string(),
            phone: "1".to_string(),
            province: "P".to_string(),
            city: "C".to_string(),
            district: "D".to_string(),
            detail: "x".to_string(),
            is_default: false,
        },
        remark: None,
    };

    // First attempt fails transiently; the caller retries the same draft.
    assert!(live.orders.submit(draft.clone()).await.is_err());
    let order = live.orders.submit(draft).await?;
    assert_eq!(order.id, "ord-1");

    let sent = transport.requests();
    assert_eq!(sent.len(), 2);
    let key_a = sent[0].header("Idempotency-Key").unwrap().to_string();
    let key_b = sent[1].header("Idempotency-Key").unwrap().to_string();
    // The unmodified retry reuses the key, so the backend can deduplicate.
    assert_eq!(key_a, key_b);

    // JSON bodies get the content-type default.
    assert_eq!(sent[0].header("content-type"), Some("application/json"));
    Ok(())
}

#[tokio::test]
async fn login_exchanges_code_and_stores_token() -> Result<()> {
    let transport = ScriptedTransport::new(vec![ok(json!({ "token": "sess-42" }))]);
    let live = live_services(transport.clone());

    let session = live.auth.login().await?;
    assert_eq!(session.token, "sess-42");
    assert_eq!(
        live.context().tokens.get_token().await,
        Some("sess-42".to_string())
    );

    let sent = transport.requests();
    assert!(sent[0].url.starts_with("https://id.example.com/auth/sessions"));

    // Logout clears back down to the configured dev token.
    live.auth.logout().await?;
    assert_eq!(
        live.context().tokens.get_token().await,
        Some("dev-bearer".to_string())
    );
    Ok(())
}
