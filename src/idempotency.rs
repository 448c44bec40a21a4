use std::sync::Mutex;

use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::domain::order::OrderDraft;

/// Fingerprint of a draft's semantic content: items sorted by SKU id, then
/// the address and remark, canonically serialized and hashed. Two drafts
/// fingerprint equal iff their canonical JSON is equal.
pub fn draft_fingerprint(draft: &OrderDraft) -> String {
    let mut canonical = draft.clone();
    canonical.items.sort_by(|a, b| a.sku_id.cmp(&b.sku_id));

    // Struct field order is fixed, so this serialization is canonical.
    let serialized = serde_json::to_string(&canonical)
        .expect("order draft serialization cannot fail");

    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hands out the `Idempotency-Key` value for order submission.
///
/// Re-sending an unmodified draft reuses the previous key so the backend
/// deduplicates the retry; any semantic change mints a fresh key. `reset`
/// is called after a terminal outcome so a later draft with a coincidentally
/// identical fingerprint cannot inherit a stale key.
#[derive(Default)]
pub struct IdempotencyKeyManager {
    last: Mutex<Option<(String, String)>>,
}

impl IdempotencyKeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_for(&self, draft: &OrderDraft) -> String {
        let fingerprint = draft_fingerprint(draft);
        let mut last = self.last.lock().unwrap();

        if let Some((prev_fingerprint, prev_key)) = last.as_ref() {
            if *prev_fingerprint == fingerprint {
                debug!(key = %prev_key, "reusing idempotency key for unchanged draft");
                return prev_key.clone();
            }
        }

        let key = Uuid::new_v4().to_string();
        debug!(key = %key, "minted idempotency key");
        *last = Some((fingerprint, key.clone()));
        key
    }

    pub fn reset(&self) {
        *self.last.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::DraftItem;
    use crate::domain::Address;

    fn draft() -> OrderDraft {
        OrderDraft {
            items: vec![
                DraftItem { sku_id: "sku-b".to_string(), qty: 2 },
                DraftItem { sku_id: "sku-a".to_string(), qty: 1 },
            ],
            address: Address {
                id: None,
                contact_name: "Lin".to_string(),
                phone: "13800000000".to_string(),
                province: "Zhejiang".to_string(),
                city: "Hangzhou".to_string(),
                district: "Xihu".to_string(),
                detail: "1 Factory Rd".to_string(),
                is_default: true,
            },
            remark: None,
        }
    }

    #[test]
    fn item_order_does_not_change_fingerprint() {
        let a = draft();
        let mut b = draft();
        b.items.reverse();
        assert_eq!(draft_fingerprint(&a), draft_fingerprint(&b));
    }

    #[test]
    fn unchanged_draft_reuses_key() {
        let manager = IdempotencyKeyManager::new();
        let k1 = manager.key_for(&draft());
        let k2 = manager.key_for(&draft());
        assert_eq!(k1, k2);
    }

    #[test]
    fn semantic_change_mints_new_key() {
        let manager = IdempotencyKeyManager::new();
        let k1 = manager.key_for(&draft());

        let mut changed = draft();
        changed.items[0].qty = 3;
        let k2 = manager.key_for(&changed);
        assert_ne!(k1, k2);

        // Reverting does not resurrect the old key; only the last pair is
        // remembered.
        let k3 = manager.key_for(&draft());
        assert_ne!(k3, k1);
        assert_ne!(k3, k2);
    }

    #[test]
    fn reset_forces_fresh_key() {
        let manager = IdempotencyKeyManager::new();
        let k1 = manager.key_for(&draft());
        manager.reset();
        let k2 = manager.key_for(&draft());
        assert_ne!(k1, k2);
    }

    #[test]
    fn address_change_alters_fingerprint() {
        let mut moved = draft();
        moved.address.city = "Shanghai".to_string();
        assert_ne!(draft_fingerprint(&draft()), draft_fingerprint(&moved));
    }
}
