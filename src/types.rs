use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

/// Request payload, opaque to the dispatcher.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    None,
    Json(serde_json::Value),
    Text(String),
    /// URL-encoded form fields.
    Form(Vec<(String, String)>),
}

impl RequestBody {
    pub fn is_none(&self) -> bool {
        matches!(self, RequestBody::None)
    }
}

/// Transport-agnostic request description. The url is fully qualified; the
/// base URL has already been joined by the facade.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: RequestBody,
    /// Caller-level timeout hint, forwarded to transports that support one.
    pub timeout_ms: Option<u64>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: RequestBody::None,
            timeout_ms: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        let mut d = Self::new(HttpMethod::Post, url);
        d.body = RequestBody::Json(body);
        d
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What a transport hands back before any classification happens.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RawResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Successful (2xx) response with its parsed payload.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope<T> {
    pub data: T,
    pub status: u16,
    pub headers: HashMap<String, String>,
}

/// Credential handed back by the platform login primitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredential {
    pub code: String,
}

/// File selected through a platform chooser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickedFile {
    pub path: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Upload request routed through the platform upload primitive.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub url: String,
    pub file_path: String,
    /// Multipart field name the backend expects the file under.
    pub field_name: String,
    pub form_fields: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
}
