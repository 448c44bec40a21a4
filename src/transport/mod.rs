//! Per-platform bindings to the network/login/file primitives.
//!
//! Exactly one adapter is active per process. The host names its platform
//! explicitly at startup; selection happens in [`select_transport`] and
//! nowhere else.

mod http;
mod unsupported;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::types::{LoginCredential, PickedFile, RawResponse, RequestDescriptor, UploadRequest};

pub use http::HttpTransport;
pub use unsupported::UnsupportedTransport;

/// Platform capability value supplied by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Wechat,
    Alipay,
    Web,
    Unknown,
}

/// The per-platform primitive bindings.
///
/// Mini-program hosts register their own bridge implementation; the crate
/// ships a reqwest-backed adapter for plain HTTP hosts and a fail-fast
/// adapter for everything else.
#[async_trait]
pub trait TransportAdapter: Send + Sync {
    /// Headers the adapter wants on every request. Caller headers win on
    /// conflict.
    fn extra_headers(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Platform login primitive, yielding a one-shot credential code.
    async fn login(&self) -> Result<LoginCredential>;

    async fn request(&self, descriptor: &RequestDescriptor) -> Result<RawResponse>;

    async fn upload_file(&self, upload: UploadRequest) -> Result<RawResponse>;

    async fn choose_image(&self, count: u8) -> Result<Vec<PickedFile>>;

    async fn choose_file(&self, count: u8) -> Result<Vec<PickedFile>>;
}

/// Pick the single adapter for this process.
///
/// Mini-program platforms need a host-registered bridge; without one there
/// is nothing this crate can call, so selection falls through to the
/// fail-fast adapter rather than silently borrowing another platform's
/// behavior.
pub fn select_transport(
    platform: Platform,
    bridge: Option<Arc<dyn TransportAdapter>>,
) -> Arc<dyn TransportAdapter> {
    match platform {
        Platform::Wechat | Platform::Alipay => match bridge {
            Some(adapter) => {
                info!(?platform, "using host-registered bridge transport");
                adapter
            }
            None => {
                info!(?platform, "mini-program platform without a bridge, failing fast");
                Arc::new(UnsupportedTransport::new("mini-program bridge not registered"))
            }
        },
        Platform::Web => {
            info!("using built-in HTTP transport");
            Arc::new(HttpTransport::new())
        }
        Platform::Unknown => {
            info!("unknown platform, failing fast");
            Arc::new(UnsupportedTransport::new("unrecognized platform"))
        }
    }
}
