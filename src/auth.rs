use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::constants::{LEGACY_TOKEN_KEY, TOKEN_KEY};
use crate::storage::KvStore;

/// Persisted credential holder for the single logical session.
///
/// Read order: persisted primary key, then the pre-migration legacy key,
/// then the process-local cache (what persistence degraded to), then the
/// development token from configuration. The legacy key is never written;
/// logout clears it so the migration converges.
pub struct TokenStore {
    kv: Arc<dyn KvStore>,
    dev_token: Option<String>,
    // Process-local fallback for when the storage subsystem glitches; a
    // login must never fail because a write was dropped.
    cache: Mutex<Option<String>>,
}

impl TokenStore {
    pub fn new(kv: Arc<dyn KvStore>, dev_token: Option<String>) -> Self {
        Self {
            kv,
            dev_token,
            cache: Mutex::new(None),
        }
    }

    pub async fn get_token(&self) -> Option<String> {
        if let Some(token) = self.kv.get(TOKEN_KEY).await {
            return Some(token);
        }
        if let Some(token) = self.kv.get(LEGACY_TOKEN_KEY).await {
            debug!("serving token from legacy key");
            return Some(token);
        }
        if let Some(token) = self.cache.lock().unwrap().clone() {
            return Some(token);
        }
        self.dev_token.clone()
    }

    /// `Some` stores a fresh session token; `None` is logout and clears
    /// every persisted key.
    pub async fn set_token(&self, token: Option<String>) {
        match token {
            Some(value) => {
                *self.cache.lock().unwrap() = Some(value.clone());
                self.kv.set(TOKEN_KEY, &value).await;
                debug!("session token stored");
            }
            None => {
                *self.cache.lock().unwrap() = None;
                self.kv.remove(TOKEN_KEY).await;
                self.kv.remove(LEGACY_TOKEN_KEY).await;
                debug!("session token cleared");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKv;

    #[tokio::test]
    async fn falls_back_to_legacy_key() {
        let kv = Arc::new(MemoryKv::new());
        kv.set(LEGACY_TOKEN_KEY, "legacy-token").await;

        let store = TokenStore::new(kv, None);
        assert_eq!(store.get_token().await, Some("legacy-token".to_string()));
    }

    #[tokio::test]
    async fn logout_clears_both_keys() {
        let kv = Arc::new(MemoryKv::new());
        kv.set(LEGACY_TOKEN_KEY, "legacy-token").await;

        let store = TokenStore::new(kv.clone(), Some("dev-token".to_string()));
        store.set_token(Some("fresh".to_string())).await;
        assert_eq!(store.get_token().await, Some("fresh".to_string()));

        store.set_token(None).await;
        assert_eq!(kv.get(TOKEN_KEY).await, None);
        assert_eq!(kv.get(LEGACY_TOKEN_KEY).await, None);
        // With persistence empty, the dev token is the last resort.
        assert_eq!(store.get_token().await, Some("dev-token".to_string()));
    }

    #[tokio::test]
    async fn no_token_anywhere_is_none() {
        let store = TokenStore::new(Arc::new(MemoryKv::new()), None);
        assert_eq!(store.get_token().await, None);
    }

    #[tokio::test]
    async fn primary_key_wins_over_legacy() {
        let kv = Arc::new(MemoryKv::new());
        kv.set(TOKEN_KEY, "primary").await;
        kv.set(LEGACY_TOKEN_KEY, "legacy").await;

        let store = TokenStore::new(kv, Some("dev".to_string()));
        assert_eq!(store.get_token().await, Some("primary".to_string()));
    }
}
