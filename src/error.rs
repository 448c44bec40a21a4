use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalized API failure shape shared by the live and offline paths.
///
/// Every facade failure surfaces as one of these; callers match on the
/// struct instead of probing response fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Unparsed response body, kept for diagnostics when the payload did
    /// not match the backend error envelope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            code: None,
            request_id: None,
            details: None,
            raw: None,
        }
    }

    /// Client errors (4xx) are never transient and must not be retried.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == 401
    }

    /// Roles offered by the backend on a 403 role-selection response.
    pub fn available_roles(&self) -> Vec<String> {
        self.details
            .as_ref()
            .and_then(|d| d.get("availableRoles"))
            .and_then(|v| v.as_array())
            .map(|roles| {
                roles
                    .iter()
                    .filter_map(|r| r.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {} ({})", self.status_code, self.message, code),
            None => write!(f, "[{}] {}", self.status_code, self.message),
        }
    }
}

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("API request failed: {0}")]
    Api(ApiError),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("operation not supported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for RuntimeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RuntimeError::Transport(format!("request timed out: {}", err))
        } else if err.is_connect() {
            RuntimeError::Transport(format!("connection failed: {}", err))
        } else {
            RuntimeError::Transport(err.to_string())
        }
    }
}

impl From<ApiError> for RuntimeError {
    fn from(err: ApiError) -> Self {
        RuntimeError::Api(err)
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
