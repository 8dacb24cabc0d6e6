//! Message signing

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::WalletManager;
use crate::blockchain::adapter_for;
use crate::core::{chain::ChainId, errors::WalletError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    pub signature: String,
    pub address: String,
}

impl WalletManager {
    /// Sign an arbitrary message with the chain's message-signing standard
    ///
    /// EVM chains use EIP-191 personal sign. Solana has no standard here and
    /// fails before the vault is touched.
    ///
    /// # Errors
    /// * `WalletError::WalletNotFound` - Unknown id
    /// * `WalletError::UnsupportedOperation` - Chain has no message signing, or the wallet has no key for it
    /// * `WalletError::WrongPassword` - Vault authentication failed
    pub async fn sign_message(
        &self,
        wallet_id: &Uuid,
        password: &str,
        message: &[u8],
        chain: ChainId,
    ) -> Result<SignedMessage, WalletError> {
        let record = self.record(wallet_id).await?;
        Self::require_chain(&record, chain)?;
        let adapter = adapter_for(chain);

        if !adapter.supports_message_signing() {
            return Err(WalletError::UnsupportedOperation {
                chain,
                operation: "sign_message".into(),
            });
        }

        let _guard = self.locks.acquire(*wallet_id).await;
        let record = self.record(wallet_id).await?;
        let password = Zeroizing::new(password.to_owned());
        let keypair = self
            .with_vault(move |vault| vault.unlock_chain(&record, &password, chain))
            .await?;
        let signature = adapter.sign_message(message, &keypair.private_key)?;

        info!(wallet_id = %wallet_id, chain = %chain, len = message.len(), "Message signed");
        Ok(SignedMessage { signature, address: keypair.public_address.clone() })
    }
}
