//! Domain service facades. One module per business area; every method
//! returns the same payload shape and throws the same `ApiError` shape
//! whether it is backed by the live requester or the mock runtime.

pub mod addresses;
pub mod after_sales;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod inquiries;
pub mod orders;
pub mod product_requests;
pub mod tracking;
pub mod uploads;
pub mod wishlist;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::TokenStore;
use crate::config::RuntimeConfig;
use crate::error::{ApiError, Result, RuntimeError};
use crate::mock::MockRuntime;
use crate::requester::Requester;
use crate::storage::{FileKv, KvStore};
use crate::transport::{select_transport, TransportAdapter};
use crate::types::ResponseEnvelope;

pub use addresses::AddressService;
pub use after_sales::AfterSalesService;
pub use auth::AuthService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use inquiries::InquiryService;
pub use orders::OrderService;
pub use product_requests::ProductRequestService;
pub use tracking::TrackingService;
pub use uploads::UploadService;
pub use wishlist::WishlistService;

pub(crate) const DEFAULT_PAGE_SIZE: u32 = 10;

/// Everything a facade needs, wired once at startup and shared by `Arc`.
pub struct CoreContext {
    pub config: RuntimeConfig,
    pub adapter: Arc<dyn TransportAdapter>,
    pub requester: Requester,
    pub tokens: Arc<TokenStore>,
    pub mock: MockRuntime,
}

impl CoreContext {
    /// Wire the context against file-backed state under
    /// `config.state_dir`. Mini-program hosts pass their bridge adapter;
    /// everyone else passes `None`.
    pub fn new(config: RuntimeConfig, bridge: Option<Arc<dyn TransportAdapter>>) -> Arc<Self> {
        let kv: Arc<dyn KvStore> = Arc::new(FileKv::new(config.state_dir.clone()));
        Self::with_kv(config, bridge, kv)
    }

    /// Same wiring over an explicit store; tests inject `MemoryKv` here.
    pub fn with_kv(
        config: RuntimeConfig,
        bridge: Option<Arc<dyn TransportAdapter>>,
        kv: Arc<dyn KvStore>,
    ) -> Arc<Self> {
        let tokens = Arc::new(TokenStore::new(
            kv.clone(),
            config.dev_token().map(str::to_string),
        ));
        let adapter = select_transport(config.platform, bridge);
        let requester = Requester::new(adapter.clone(), tokens.clone());
        let mock = MockRuntime::new(kv);
        Arc::new(Self { config, adapter, requester, tokens, mock })
    }

    pub fn offline(&self) -> bool {
        self.config.isolated_mock
    }

    pub fn gateway_url(&self, path: &str) -> String {
        join_url(&self.config.gateway.base_url, path)
    }

    pub fn commerce_url(&self, path: &str) -> String {
        join_url(&self.config.commerce.base_url, path)
    }

    pub fn identity_url(&self, path: &str) -> String {
        join_url(&self.config.identity.base_url, path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// All facades over one shared context.
pub struct Services {
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub cart: CartService,
    pub orders: OrderService,
    pub tracking: TrackingService,
    pub wishlist: WishlistService,
    pub after_sales: AfterSalesService,
    pub inquiries: InquiryService,
    pub addresses: AddressService,
    pub product_requests: ProductRequestService,
    pub uploads: UploadService,
    context: Arc<CoreContext>,
}

impl Services {
    pub fn new(context: Arc<CoreContext>) -> Self {
        Self {
            auth: AuthService::new(context.clone()),
            catalog: CatalogService::new(context.clone()),
            cart: CartService::new(context.clone()),
            orders: OrderService::new(context.clone()),
            tracking: TrackingService::new(context.clone()),
            wishlist: WishlistService::new(context.clone()),
            after_sales: AfterSalesService::new(context.clone()),
            inquiries: InquiryService::new(context.clone()),
            addresses: AddressService::new(context.clone()),
            product_requests: ProductRequestService::new(context.clone()),
            uploads: UploadService::new(context.clone()),
            context,
        }
    }

    pub fn context(&self) -> &Arc<CoreContext> {
        &self.context
    }

    /// Return the offline runtime to first-run defaults: snapshot gone,
    /// session gone.
    pub async fn reset_offline_state(&self) {
        self.context.mock.reset().await;
        self.context.tokens.set_token(None).await;
    }
}

/// Decode a success envelope into the facade's typed payload.
pub(crate) fn decode<T: DeserializeOwned>(envelope: ResponseEnvelope<Value>) -> Result<T> {
    Ok(serde_json::from_value(envelope.data)?)
}

/// Mock-side failures must carry the exact same shape as live ones.
pub(crate) fn mock_api_error(status: u16, code: &str, message: &str) -> RuntimeError {
    let mut error = ApiError::new(status, message);
    error.code = Some(code.to_string());
    RuntimeError::Api(error)
}
