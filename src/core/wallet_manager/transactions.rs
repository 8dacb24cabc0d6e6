//! Transaction operations
//!
//! Validate → lock → fetch params → unlock one chain → build → sign → drop
//! key → submit.

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::WalletManager;
use crate::blockchain::{adapter_for, units};
use crate::core::{chain::ChainId, errors::WalletError};
use crate::security::redaction::{redact_bytes, short_address};

/// A native-coin transfer request.
#[derive(Debug)]
pub struct SendRequest {
    pub wallet_id: Uuid,
    pub password: SecretString,
    pub chain: ChainId,
    pub to: String,
    /// Whole coins (ETH, MATIC, BNB, SOL).
    pub amount: Decimal,
}

impl SendRequest {
    pub fn new(
        wallet_id: Uuid,
        password: &str,
        chain: ChainId,
        to: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            wallet_id,
            password: SecretString::new(password.to_string()),
            chain,
            to: to.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentTransaction {
    pub hash: String,
    pub chain: ChainId,
}

impl WalletManager {
    /// Send native coins from a wallet
    ///
    /// Destination and amount are validated before any RPC call. Operations
    /// on the same wallet are serialized for the whole
    /// fetch-sign-submit sequence so nonces never collide. The private key is
    /// dropped before the submission await.
    ///
    /// # Errors
    /// * `WalletError::WalletNotFound` - Unknown id
    /// * `WalletError::InvalidDestination` / `WalletError::InvalidAmount` - Rejected input
    /// * `WalletError::Network` - Transaction params could not be fetched
    /// * `WalletError::WrongPassword` - Vault authentication failed
    /// * `WalletError::SubmissionFailed` - The node rejected or never received the transaction
    pub async fn send_transaction(
        &self,
        request: SendRequest,
    ) -> Result<SentTransaction, WalletError> {
        let SendRequest { wallet_id, password, chain, to, amount } = request;
        let record = self.record(&wallet_id).await?;
        Self::require_chain(&record, chain)?;

        let adapter = adapter_for(chain);
        adapter.validate_address(&to)?;
        units::to_smallest_unit(chain, amount)?;
        let rpc = self.rpc(chain)?;
        let from = record.public_addresses[&chain].clone();

        info!(
            wallet_id = %wallet_id,
            chain = %chain,
            to = %short_address(&to),
            amount = %amount,
            "Sending transaction"
        );

        let _guard = self.locks.acquire(wallet_id).await;
        // a delete may have run while we waited
        let record = self.record(&wallet_id).await?;

        let params = rpc
            .get_transaction_params(&from)
            .await
            .map_err(|cause| WalletError::Network { chain, cause })?;

        // 私钥只在这个块里存活
        let signed = {
            let password = Zeroizing::new(password.expose_secret().clone());
            let keypair = self
                .with_vault(move |vault| vault.unlock_chain(&record, &password, chain))
                .await?;
            let raw = adapter.build_transaction(&keypair, &to, amount, &params)?;
            adapter.sign_transaction(&raw, &keypair.private_key)?
        };
        debug!(chain = %chain, tx = %redact_bytes(&signed.bytes), local_hash = %signed.hash, "Signed transaction");

        // 广播
        let hash = adapter.submit(rpc, &signed).await?;
        Ok(SentTransaction { hash, chain })
    }
}
