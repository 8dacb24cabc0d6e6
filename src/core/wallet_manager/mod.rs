//! Wallet Manager Core Module
//!
//! Orchestrates derivation, the vault, chain adapters and RPC clients.
//!
//! ## Module Structure
//! - `lifecycle` - Wallet lifecycle (create, delete, list, export/import)
//! - `balance` - Balance queries
//! - `transactions` - Build, sign and submit transfers
//! - `signing` - Message signing
//! - `dapp` - DApp connection handshake
//! - `locks` - Per-wallet mutual exclusion

pub mod balance;
pub mod dapp;
pub mod lifecycle;
pub mod locks;
pub mod signing;
pub mod transactions;

pub use dapp::{DAppConnection, DAppSession};
pub use locks::WalletLocks;
pub use signing::SignedMessage;
pub use transactions::{SendRequest, SentTransaction};

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::blockchain::{rpc_client_for, RpcClient};
use crate::core::{
    chain::ChainId,
    config::WalletConfig,
    errors::{VaultError, WalletError},
    wallet_info::WalletRecord,
};
use crate::security::vault::{EncryptedVault, KdfParams, KeyVault};
use crate::storage::{FileWalletStore, MemoryWalletStore, WalletStore};

/// Wallet manager
///
/// Owns the record store, the vault, one RPC client per configured chain and
/// the per-wallet locks. Network configuration is fixed at construction.
pub struct WalletManager {
    rpc_clients: BTreeMap<ChainId, Arc<dyn RpcClient>>,
    vault: Arc<dyn KeyVault>,
    store: Arc<dyn WalletStore>,
    locks: WalletLocks,
}

impl WalletManager {
    /// Manager with an in-memory store.
    ///
    /// # Errors
    /// * `WalletError::Config` - no networks, a bad RPC URL, or rejected KDF parameters
    pub fn new(config: &WalletConfig) -> Result<Self, WalletError> {
        Self::with_store(config, Arc::new(MemoryWalletStore::new()))
    }

    /// Manager persisting records under `config.storage.wallet_dir`.
    pub async fn with_file_store(config: &WalletConfig) -> Result<Self, WalletError> {
        let store = FileWalletStore::open(&config.storage.wallet_dir).await?;
        Self::with_store(config, Arc::new(store))
    }

    /// Manager over a caller-supplied store, with clients and vault built from `config`.
    pub fn with_store(
        config: &WalletConfig,
        store: Arc<dyn WalletStore>,
    ) -> Result<Self, WalletError> {
        let networks = config.resolved_networks()?;
        let mut rpc_clients = BTreeMap::new();
        for (chain, network) in &networks {
            rpc_clients.insert(*chain, rpc_client_for(*chain, network)?);
        }

        let vault = EncryptedVault::new(KdfParams::from(&config.security))
            .map_err(|e| WalletError::Config(e.to_string()))?;
        Self::with_components(rpc_clients, Arc::new(vault), store)
    }

    /// Fully injected manager.
    pub fn with_components(
        rpc_clients: BTreeMap<ChainId, Arc<dyn RpcClient>>,
        vault: Arc<dyn KeyVault>,
        store: Arc<dyn WalletStore>,
    ) -> Result<Self, WalletError> {
        if rpc_clients.is_empty() {
            return Err(WalletError::Config("no networks configured".into()));
        }
        info!(
            chains = ?rpc_clients.keys().map(|c| c.as_str()).collect::<Vec<_>>(),
            "Wallet manager initialized"
        );
        Ok(Self { rpc_clients, vault, store, locks: WalletLocks::default() })
    }

    /// Chains with a configured RPC endpoint.
    pub fn configured_chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.rpc_clients.keys().copied()
    }

    pub(crate) fn rpc(&self, chain: ChainId) -> Result<&dyn RpcClient, WalletError> {
        self.rpc_clients
            .get(&chain)
            .map(|client| client.as_ref())
            .ok_or_else(|| WalletError::Config(format!("no rpc endpoint configured for {}", chain)))
    }

    /// Loads a record or fails with `WalletNotFound`.
    pub(crate) async fn record(&self, wallet_id: &Uuid) -> Result<WalletRecord, WalletError> {
        self.store
            .get(wallet_id)
            .await?
            .ok_or_else(|| WalletError::WalletNotFound(wallet_id.to_string()))
    }

    /// Runs a vault call on the blocking pool; Argon2 must not stall the runtime.
    pub(crate) async fn with_vault<T, F>(&self, op: F) -> Result<T, WalletError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn KeyVault) -> Result<T, VaultError> + Send + 'static,
    {
        let vault = self.vault.clone();
        tokio::task::spawn_blocking(move || op(vault.as_ref()))
            .await
            .map_err(|e| WalletError::Encryption(format!("vault task failed: {}", e)))?
            .map_err(WalletError::from)
    }

    /// Checks that the wallet holds a key for `chain`.
    pub(crate) fn require_chain(record: &WalletRecord, chain: ChainId) -> Result<(), WalletError> {
        if record.public_addresses.contains_key(&chain) {
            Ok(())
        } else {
            Err(WalletError::UnsupportedOperation {
                chain,
                operation: format!("wallet {} holds no {} key", record.wallet_id, chain),
            })
        }
    }
}

/// Parses a wallet id. Anything that is not a UUID cannot name a wallet.
pub fn parse_wallet_id(raw: &str) -> Result<Uuid, WalletError> {
    Uuid::parse_str(raw.trim()).map_err(|_| WalletError::WalletNotFound(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::NetworkConfig;
    use std::collections::HashMap;

    #[test]
    fn test_new_from_default_config() {
        let manager = WalletManager::new(&WalletConfig::default()).unwrap();
        assert_eq!(manager.configured_chains().count(), ChainId::ALL.len());
    }

    #[test]
    fn test_empty_networks_rejected() {
        let config = WalletConfig { networks: HashMap::new(), ..WalletConfig::default() };
        assert!(matches!(WalletManager::new(&config), Err(WalletError::Config(_))));
    }

    #[test]
    fn test_bad_kdf_rejected() {
        let mut config = WalletConfig::default();
        config.security.argon2_iterations = 0;
        assert!(matches!(WalletManager::new(&config), Err(WalletError::Config(_))));
    }

    #[test]
    fn test_rpc_for_unconfigured_chain() {
        let mut networks = HashMap::new();
        networks.insert("solana".to_string(), NetworkConfig { rpc_url: "http://localhost:8899".into() });
        let config = WalletConfig { networks, ..WalletConfig::default() };
        let manager = WalletManager::new(&config).unwrap();
        assert!(manager.rpc(ChainId::Solana).is_ok());
        assert!(matches!(manager.rpc(ChainId::Ethereum), Err(WalletError::Config(_))));
    }

    #[test]
    fn test_parse_wallet_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_wallet_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_wallet_id("nope"), Err(WalletError::WalletNotFound(_))));
    }
}
