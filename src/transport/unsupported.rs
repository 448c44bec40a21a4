use async_trait::async_trait;

use crate::error::{Result, RuntimeError};
use crate::types::{LoginCredential, PickedFile, RawResponse, RequestDescriptor, UploadRequest};

use super::TransportAdapter;

/// Fail-fast adapter selected when no known platform is available.
///
/// Every operation rejects with the same reason so a misconfigured host
/// surfaces immediately instead of inheriting some other platform's
/// behavior.
pub struct UnsupportedTransport {
    reason: &'static str,
}

impl UnsupportedTransport {
    pub fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

#[async_trait]
impl TransportAdapter for UnsupportedTransport {
    async fn login(&self) -> Result<LoginCredential> {
        Err(RuntimeError::Unsupported(self.reason))
    }

    async fn request(&self, _descriptor: &RequestDescriptor) -> Result<RawResponse> {
        Err(RuntimeError::Unsupported(self.reason))
    }

    async fn upload_file(&self, _upload: UploadRequest) -> Result<RawResponse> {
        Err(RuntimeError::Unsupported(self.reason))
    }

    async fn choose_image(&self, _count: u8) -> Result<Vec<PickedFile>> {
        Err(RuntimeError::Unsupported(self.reason))
    }

    async fn choose_file(&self, _count: u8) -> Result<Vec<PickedFile>> {
        Err(RuntimeError::Unsupported(self.reason))
    }
}
