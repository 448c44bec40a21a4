use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{ApiError, Result, RuntimeError};
use crate::types::UploadRequest;

use super::CoreContext;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// File uploads through the platform upload primitive.
pub struct UploadService {
    ctx: Arc<CoreContext>,
}

impl UploadService {
    pub fn new(ctx: Arc<CoreContext>) -> Self {
        Self { ctx }
    }

    /// Upload a local file and return its served URL. Offline, the ref is
    /// derived from the path so re-uploading the same file is stable.
    pub async fn upload_file(&self, file_path: &str) -> Result<String> {
        if self.ctx.offline() {
            let mut hasher = Sha256::new();
            hasher.update(file_path.as_bytes());
            let digest = hex::encode(hasher.finalize());
            return Ok(format!("mock://uploads/{}", &digest[..16]));
        }

        let raw = self
            .ctx
            .adapter
            .upload_file(UploadRequest {
                url: self.ctx.gateway_url("/files"),
                file_path: file_path.to_string(),
                field_name: "file".to_string(),
                form_fields: Vec::new(),
                headers: HashMap::new(),
            })
            .await?;

        if !(200..300).contains(&raw.status) {
            return Err(RuntimeError::Api(ApiError::new(raw.status, "upload failed")));
        }

        let parsed: UploadResponse = serde_json::from_str(&raw.body)?;
        Ok(parsed.url)
    }

    /// Platform chooser + upload in one step, for screens that attach an
    /// image directly.
    pub async fn choose_and_upload_image(&self) -> Result<Option<String>> {
        if self.ctx.offline() {
            return Ok(Some("mock://uploads/chosen-image".to_string()));
        }

        let picked = self.ctx.adapter.choose_image(1).await?;
        match picked.first() {
            Some(file) => Ok(Some(self.upload_file(&file.path).await?)),
            None => Ok(None),
        }
    }
}
