//! Storage keys and wire constants shared across the runtime.

/// Primary persisted key for the session bearer token.
pub const TOKEN_KEY: &str = "auth.token";

/// Pre-migration token key. Read as a fallback, cleared on logout, never
/// written.
pub const LEGACY_TOKEN_KEY: &str = "token";

/// Single persisted document holding the entire isolated mock snapshot.
pub const MOCK_STATE_KEY: &str = "isolated.mock.state";

/// Header carrying the order submission deduplication key.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Header the backend stamps on every response for correlation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";
