use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Result, RuntimeError};

#[derive(Debug, Clone, Copy)]
pub struct RetryOptions {
    pub retries: u32,
    pub delay_ms: u64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self { retries: 2, delay_ms: 200 }
    }
}

/// Bounded retry with linear back-off for read-style operations.
///
/// 4xx responses are client errors and rethrow immediately; everything
/// else (5xx, transport failures) is treated as transient until the
/// attempts run out. Mutations must not come through here; they pair an
/// idempotency key with caller-level retry instead.
pub async fn with_retry<T, F, Fut>(mut op: F, options: RetryOptions) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(RuntimeError::Api(api)) if api.is_client_error() => {
                debug!(status = api.status_code, "client error, not retrying");
                return Err(RuntimeError::Api(api));
            }
            Err(err) => {
                if attempt > options.retries {
                    return Err(err);
                }
                let delay = Duration::from_millis(options.delay_ms * attempt as u64);
                warn!(attempt, ?delay, error = %err, "transient failure, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn exhausts_retries_on_5xx() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(RuntimeError::Api(ApiError::new(503, "unavailable"))) }
            },
            RetryOptions { retries: 2, delay_ms: 1 },
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result.unwrap_err() {
            RuntimeError::Api(api) => assert_eq!(api.status_code, 503),
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn client_error_short_circuits() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(RuntimeError::Api(ApiError::new(404, "missing"))) }
            },
            RetryOptions { retries: 2, delay_ms: 1 },
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        match result.unwrap_err() {
            RuntimeError::Api(api) => assert_eq!(api.status_code, 404),
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = with_retry(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(RuntimeError::Transport("connection reset".to_string()))
                    } else {
                        Ok(41 + 1)
                    }
                }
            },
            RetryOptions { retries: 2, delay_ms: 1 },
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
