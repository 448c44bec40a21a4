use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, RuntimeError};
use crate::types::{
    HttpMethod, LoginCredential, PickedFile, RawResponse, RequestBody, RequestDescriptor,
    UploadRequest,
};

use super::TransportAdapter;

/// Plain-HTTP adapter for hosts with direct network access.
///
/// Login and file choosers are platform UI primitives that do not exist
/// here; those reject so the caller hears the truth instead of a stub.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    fn method_of(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }

    async fn collect(resp: reqwest::Response) -> Result<RawResponse> {
        let status = resp.status().as_u16();
        let mut headers = HashMap::new();
        for (name, value) in resp.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_string(), v.to_string());
            }
        }
        let body = resp.text().await?;
        Ok(RawResponse { status, headers, body })
    }
}

#[async_trait]
impl TransportAdapter for HttpTransport {
    async fn login(&self) -> Result<LoginCredential> {
        Err(RuntimeError::Unsupported("login primitive requires a mini-program host"))
    }

    async fn request(&self, descriptor: &RequestDescriptor) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(Self::method_of(descriptor.method), &descriptor.url);

        for (name, value) in &descriptor.headers {
            builder = builder.header(name, value);
        }

        match &descriptor.body {
            RequestBody::None => {}
            RequestBody::Json(value) => builder = builder.body(value.to_string()),
            RequestBody::Text(text) => builder = builder.body(text.clone()),
            RequestBody::Form(fields) => builder = builder.form(fields),
        }

        if let Some(ms) = descriptor.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        debug!(method = descriptor.method.as_str(), url = %descriptor.url, "dispatching request");
        let resp = builder.send().await?;
        Self::collect(resp).await
    }

    async fn upload_file(&self, upload: UploadRequest) -> Result<RawResponse> {
        let bytes = tokio::fs::read(&upload.file_path).await?;
        let file_name = std::path::Path::new(&upload.file_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        let mut form = reqwest::multipart::Form::new().part(
            upload.field_name.clone(),
            reqwest::multipart::Part::bytes(bytes).file_name(file_name),
        );
        for (name, value) in &upload.form_fields {
            form = form.text(name.clone(), value.clone());
        }

        let mut builder = self.client.post(&upload.url).multipart(form);
        for (name, value) in &upload.headers {
            builder = builder.header(name, value);
        }

        debug!(url = %upload.url, "uploading file");
        let resp = builder.send().await?;
        Self::collect(resp).await
    }

    async fn choose_image(&self, _count: u8) -> Result<Vec<PickedFile>> {
        Err(RuntimeError::Unsupported("image chooser requires a mini-program host"))
    }

    async fn choose_file(&self, _count: u8) -> Result<Vec<PickedFile>> {
        Err(RuntimeError::Unsupported("file chooser requires a mini-program host"))
    }
}
