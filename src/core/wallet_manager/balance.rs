//! Balance queries
//!
//! Balances only need public addresses, so no password is taken and the
//! vault is never touched.

use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::WalletManager;
use crate::blockchain::adapter_for;
use crate::core::{chain::ChainId, errors::WalletError};

impl WalletManager {
    /// Query native balances on every configured chain the wallet holds a key for
    ///
    /// Chains are queried concurrently. Any failing chain fails the call.
    ///
    /// # Errors
    /// * `WalletError::WalletNotFound` - Unknown id (no RPC call is made)
    /// * `WalletError::Network` - An RPC call failed or returned garbage
    pub async fn get_balances(
        &self,
        wallet_id: &Uuid,
    ) -> Result<BTreeMap<ChainId, Decimal>, WalletError> {
        let record = self.record(wallet_id).await?;
        let chains: Vec<ChainId> = record
            .chains()
            .filter(|chain| self.rpc_clients.contains_key(chain))
            .collect();
        info!(wallet_id = %wallet_id, chains = chains.len(), "Querying balances");

        let results = join_all(chains.iter().map(|chain| {
            let address = record.public_addresses[chain].as_str();
            self.query_balance(*chain, address)
        }))
        .await;

        let mut balances = BTreeMap::new();
        for (chain, result) in chains.into_iter().zip(results) {
            balances.insert(chain, result?);
        }
        Ok(balances)
    }

    /// Query the native balance on one chain
    pub async fn get_balance(&self, wallet_id: &Uuid, chain: ChainId) -> Result<Decimal, WalletError> {
        let record = self.record(wallet_id).await?;
        Self::require_chain(&record, chain)?;
        let address = record.public_addresses[&chain].clone();
        self.query_balance(chain, &address).await
    }

    async fn query_balance(&self, chain: ChainId, address: &str) -> Result<Decimal, WalletError> {
        let raw = self
            .rpc(chain)?
            .get_balance(address)
            .await
            .map_err(|cause| {
                warn!(chain = %chain, error = %cause, "Balance query failed");
                WalletError::Network { chain, cause }
            })?;
        let balance = adapter_for(chain).decode_balance(&raw)?;
        debug!(chain = %chain, balance = %balance, "Balance decoded");
        Ok(balance)
    }
}
