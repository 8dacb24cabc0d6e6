// tests/common/mod.rs
// Shared doubles for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::U256;
use ethers::utils::keccak256;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use web3_wallet_core::core::domain::{ChainKeypair, KeySet};
use web3_wallet_core::security::vault::{EncryptedVault, KdfParams, KeyVault};
use web3_wallet_core::storage::MemoryWalletStore;
use web3_wallet_core::{
    ChainId, RpcClient, RpcError, TransactionParams, VaultError, WalletManager, WalletRecord,
};

pub const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
pub const ABANDON_EVM: &str = "0x9858EfFD232B4033E47d90003D41EC34EcaEda94";
pub const ABANDON_SOL: &str = "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk";
pub const PASSWORD: &str = "pw123";
pub const BLOCKHASH: &str = "EETubP5AKHgjPAhzPAFcb8BAY1hMH639CWCFTqi3hq1k";

/// Cheap Argon2 settings so tests don't spend seconds per unlock.
pub fn fast_params() -> KdfParams {
    KdfParams { m_cost: 64, t_cost: 1, p_cost: 1 }
}

pub fn fast_vault() -> EncryptedVault {
    EncryptedVault::new(fast_params()).unwrap()
}

/// Scripted node for one chain. Counts every call it receives.
pub struct MockRpc {
    chain: ChainId,
    calls: AtomicUsize,
    nonce: AtomicU64,
    balance: Mutex<serde_json::Value>,
    reject_submit: AtomicBool,
    submit_delay: Mutex<Duration>,
    submitted: Mutex<Vec<Vec<u8>>>,
}

impl MockRpc {
    pub fn new(chain: ChainId) -> Arc<Self> {
        let balance = match chain {
            ChainId::Solana => serde_json::json!({ "context": { "slot": 1 }, "value": 2_500_000_000u64 }),
            _ => serde_json::json!("0xde0b6b3a7640000"),
        };
        Arc::new(Self {
            chain,
            calls: AtomicUsize::new(0),
            nonce: AtomicU64::new(0),
            balance: Mutex::new(balance),
            reject_submit: AtomicBool::new(false),
            submit_delay: Mutex::new(Duration::from_millis(5)),
            submitted: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_balance(&self, value: serde_json::Value) {
        *self.balance.lock() = value;
    }

    pub fn reject_submissions(&self) {
        self.reject_submit.store(true, Ordering::SeqCst);
    }

    /// How long `submit` waits before answering.
    pub fn set_submit_delay(&self, delay: Duration) {
        *self.submit_delay.lock() = delay;
    }

    pub fn submitted(&self) -> Vec<Vec<u8>> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl RpcClient for MockRpc {
    async fn get_balance(&self, _address: &str) -> Result<serde_json::Value, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance.lock().clone())
    }

    async fn get_transaction_params(&self, _address: &str) -> Result<TransactionParams, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match self.chain {
            ChainId::Solana => TransactionParams::Solana { recent_blockhash: BLOCKHASH.into() },
            _ => TransactionParams::Evm {
                nonce: self.nonce.load(Ordering::SeqCst),
                gas_price: U256::from(1_000_000_000u64),
            },
        })
    }

    async fn submit(&self, signed: &[u8]) -> Result<String, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.submit_delay.lock();
        tokio::time::sleep(delay).await;
        if self.reject_submit.load(Ordering::SeqCst) {
            return Err(RpcError::Rejected("nonce too low".into()));
        }
        self.nonce.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().push(signed.to_vec());
        Ok(match self.chain {
            ChainId::Solana => bs58::encode(&signed[1..65]).into_string(),
            _ => format!("0x{}", hex::encode(keccak256(signed))),
        })
    }
}

/// Vault wrapper that records how many unlocks overlap.
pub struct TrackingVault {
    inner: EncryptedVault,
    active: AtomicUsize,
    max_active: AtomicUsize,
    unlocks: AtomicUsize,
    hold: Duration,
}

impl TrackingVault {
    pub fn new(hold: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner: fast_vault(),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            unlocks: AtomicUsize::new(0),
            hold,
        })
    }

    pub fn max_concurrent_unlocks(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn unlocks(&self) -> usize {
        self.unlocks.load(Ordering::SeqCst)
    }
}

impl KeyVault for TrackingVault {
    fn seal(&self, wallet_id: Uuid, keys: &KeySet, password: &str) -> Result<WalletRecord, VaultError> {
        self.inner.seal(wallet_id, keys, password)
    }

    fn unlock(&self, record: &WalletRecord, password: &str) -> Result<KeySet, VaultError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.unlocks.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.hold);
        let result = self.inner.unlock(record, password);
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn unlock_chain(
        &self,
        record: &WalletRecord,
        password: &str,
        chain: ChainId,
    ) -> Result<ChainKeypair, VaultError> {
        let mut keys = self.unlock(record, password)?;
        keys.remove(&chain)
            .ok_or_else(|| VaultError::CorruptRecord(format!("no sealed key for {}", chain)))
    }
}

/// A manager over mock nodes for every chain, plus handles to those nodes.
pub struct Harness {
    pub manager: WalletManager,
    pub nodes: BTreeMap<ChainId, Arc<MockRpc>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_vault(Arc::new(fast_vault()))
    }

    pub fn with_vault(vault: Arc<dyn KeyVault>) -> Self {
        Self::for_chains(&ChainId::ALL, vault)
    }

    pub fn for_chains(chains: &[ChainId], vault: Arc<dyn KeyVault>) -> Self {
        let nodes: BTreeMap<ChainId, Arc<MockRpc>> =
            chains.iter().map(|chain| (*chain, MockRpc::new(*chain))).collect();
        let rpc_clients: BTreeMap<ChainId, Arc<dyn RpcClient>> = nodes
            .iter()
            .map(|(chain, node)| (*chain, node.clone() as Arc<dyn RpcClient>))
            .collect();
        let manager =
            WalletManager::with_components(rpc_clients, vault, Arc::new(MemoryWalletStore::new()))
                .unwrap();
        Self { manager, nodes }
    }

    pub fn node(&self, chain: ChainId) -> &MockRpc {
        &self.nodes[&chain]
    }

    pub fn total_calls(&self) -> usize {
        self.nodes.values().map(|node| node.calls()).sum()
    }

    pub async fn abandon_wallet(&self) -> Uuid {
        self.manager.create_wallet(ABANDON, None, PASSWORD).await.unwrap().wallet_id
    }
}
