use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, warn};

/// Persisted key-value store for client state.
///
/// Every operation is infallible by contract: a storage failure must never
/// surface to a caller, because losing a cached token or mock snapshot is
/// not fatal. Implementations log the failure and degrade: `get` to
/// `None`, `set`/`remove` to a no-op.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str);
    async fn remove(&self, key: &str);
}

/// File-backed store: one file per key under a root directory.
pub struct FileKv {
    root: PathBuf,
}

impl FileKv {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are dotted logical names; keep them filesystem-safe.
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(name)
    }
}

#[async_trait]
impl KvStore for FileKv {
    async fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "kv read failed, degrading to empty");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str) {
        let path = self.path_for(key);
        if let Err(e) = std::fs::create_dir_all(&self.root) {
            warn!(key, error = %e, "kv root creation failed, dropping write");
            return;
        }
        if let Err(e) = std::fs::write(&path, value) {
            warn!(key, error = %e, "kv write failed, dropping write");
        } else {
            debug!(key, bytes = value.len(), "kv write");
        }
    }

    async fn remove(&self, key: &str) {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(key, "kv remove"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(key, error = %e, "kv remove failed"),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryKv {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
    }

    async fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
    }
}
