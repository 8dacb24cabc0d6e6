//! Persistence of sealed `WalletRecord`s.
//!
//! Stores never see plaintext keys; they hold the opaque record only.

mod file;

pub use file::FileWalletStore;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::errors::WalletError;
use crate::core::wallet_info::WalletRecord;

#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn get(&self, wallet_id: &Uuid) -> Result<Option<WalletRecord>, WalletError>;

    /// Inserts a new record. An existing id fails with `DuplicateWallet`.
    async fn insert_new(&self, record: WalletRecord) -> Result<(), WalletError>;

    /// Removes a record, returning whether it existed.
    async fn remove(&self, wallet_id: &Uuid) -> Result<bool, WalletError>;

    async fn list(&self) -> Result<Vec<WalletRecord>, WalletError>;
}

/// In-process store. Reads run concurrently; inserts take the write lock.
#[derive(Debug, Default)]
pub struct MemoryWalletStore {
    records: RwLock<HashMap<Uuid, WalletRecord>>,
}

impl MemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for MemoryWalletStore {
    async fn get(&self, wallet_id: &Uuid) -> Result<Option<WalletRecord>, WalletError> {
        Ok(self.records.read().get(wallet_id).cloned())
    }

    async fn insert_new(&self, record: WalletRecord) -> Result<(), WalletError> {
        let mut records = self.records.write();
        if records.contains_key(&record.wallet_id) {
            return Err(WalletError::DuplicateWallet(record.wallet_id.to_string()));
        }
        records.insert(record.wallet_id, record);
        Ok(())
    }

    async fn remove(&self, wallet_id: &Uuid) -> Result<bool, WalletError> {
        Ok(self.records.write().remove(wallet_id).is_some())
    }

    async fn list(&self) -> Result<Vec<WalletRecord>, WalletError> {
        let mut records: Vec<WalletRecord> = self.records.read().values().cloned().collect();
        records.sort_by(|a, b| {
            a.created_at.cmp(&b.created_at).then_with(|| a.wallet_id.cmp(&b.wallet_id))
        });
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn record() -> WalletRecord {
        WalletRecord {
            wallet_id: Uuid::new_v4(),
            ciphertext: vec![1, 2, 3],
            public_addresses: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_memory_insert_get_remove() {
        let store = MemoryWalletStore::new();
        let rec = record();
        let id = rec.wallet_id;

        store.insert_new(rec.clone()).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap(), Some(rec));
        assert_eq!(store.list().await.unwrap().len(), 1);

        assert!(store.remove(&id).await.unwrap());
        assert!(!store.remove(&id).await.unwrap());
        assert_eq!(store.get(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_duplicate_rejected() {
        let store = MemoryWalletStore::new();
        let rec = record();
        store.insert_new(rec.clone()).await.unwrap();
        assert!(matches!(
            store.insert_new(rec).await,
            Err(WalletError::DuplicateWallet(_))
        ));
    }
}
