//! Per-wallet async mutexes.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of one async mutex per wallet id.
///
/// The registry map sits behind a `parking_lot::Mutex` that is only held to
/// look up or insert an entry and never across an `.await`. The per-wallet
/// guard is owned, so it can be held across RPC calls and is released when
/// the holding future completes or is dropped.
#[derive(Debug, Default)]
pub struct WalletLocks {
    inner: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl WalletLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, wallet_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock();
            map.entry(wallet_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drops the registry entry for a deleted wallet. Holders keep their `Arc`.
    pub fn forget(&self, wallet_id: &Uuid) {
        self.inner.lock().remove(wallet_id);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
