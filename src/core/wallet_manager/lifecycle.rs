//! Wallet lifecycle management
//!
//! Provides wallet creation, deletion, listing and record hand-off.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::WalletManager;
use crate::core::{
    chain::ChainId,
    derivation,
    errors::WalletError,
    wallet_info::{CreatedWallet, WalletRecord, WalletSummary},
};
use crate::security::redaction::short_address;

impl WalletManager {
    /// Create a wallet from a BIP-39 mnemonic
    ///
    /// Keys are derived for every supported chain, sealed under `password`,
    /// and only the public addresses are returned.
    ///
    /// # Arguments
    /// * `mnemonic` - English BIP-39 phrase; whitespace and case are normalized
    /// * `passphrase` - Optional BIP-39 passphrase (the "25th word")
    /// * `password` - Vault password
    ///
    /// # Errors
    /// * `WalletError::InvalidMnemonic` - Unknown word or bad checksum
    /// * `WalletError::DerivationFailure` - A derivation step failed
    /// * `WalletError::Encryption` - Sealing failed
    pub async fn create_wallet(
        &self,
        mnemonic: &str,
        passphrase: Option<&str>,
        password: &str,
    ) -> Result<CreatedWallet, WalletError> {
        // 派生所有链的密钥
        let chains: BTreeSet<ChainId> = ChainId::ALL.into_iter().collect();
        let keys = derivation::derive(mnemonic, passphrase.unwrap_or(""), &chains)?;

        let wallet_id = Uuid::new_v4();
        let password = Zeroizing::new(password.to_owned());
        let record = self
            .with_vault(move |vault| vault.seal(wallet_id, &keys, &password))
            .await?;

        let addresses = record.public_addresses.clone();
        self.store.insert_new(record).await?;

        info!(
            wallet_id = %wallet_id,
            evm = %addresses.get(&ChainId::Ethereum).map(|a| short_address(a)).unwrap_or_default(),
            "Wallet created"
        );
        Ok(CreatedWallet { wallet_id, addresses })
    }

    /// Generate a fresh 12- or 24-word English mnemonic
    pub fn generate_mnemonic(&self, word_count: usize) -> Result<Zeroizing<String>, WalletError> {
        Ok(derivation::generate_mnemonic(word_count)?)
    }

    /// List wallets, oldest first
    pub async fn list_wallets(&self) -> Result<Vec<WalletSummary>, WalletError> {
        let records = self.store.list().await?;
        Ok(records.iter().map(WalletSummary::from).collect())
    }

    /// Public addresses of a wallet. No password needed.
    pub async fn wallet_addresses(
        &self,
        wallet_id: &Uuid,
    ) -> Result<BTreeMap<ChainId, String>, WalletError> {
        Ok(self.record(wallet_id).await?.public_addresses)
    }

    /// Delete a wallet record
    ///
    /// Waits for in-flight operations on the wallet to finish first.
    ///
    /// # Errors
    /// * `WalletError::WalletNotFound` - No record with that id
    pub async fn delete_wallet(&self, wallet_id: &Uuid) -> Result<(), WalletError> {
        let guard = self.locks.acquire(*wallet_id).await;
        let removed = self.store.remove(wallet_id).await?;
        drop(guard);
        self.locks.forget(wallet_id);

        if !removed {
            return Err(WalletError::WalletNotFound(wallet_id.to_string()));
        }
        info!(wallet_id = %wallet_id, "Wallet deleted");
        Ok(())
    }

    /// Check a password by unlocking and immediately discarding the keys
    ///
    /// # Errors
    /// * `WalletError::WrongPassword` - Authentication failed
    /// * `WalletError::CorruptRecord` - The stored blob is malformed
    pub async fn verify_password(&self, wallet_id: &Uuid, password: &str) -> Result<(), WalletError> {
        let _guard = self.locks.acquire(*wallet_id).await;
        let record = self.record(wallet_id).await?;
        let password = Zeroizing::new(password.to_owned());
        match self.with_vault(move |vault| vault.unlock(&record, &password).map(drop)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(wallet_id = %wallet_id, error = %e, "Password check failed");
                Err(e)
            }
        }
    }

    /// Export the sealed record for backup or transfer to another store
    pub async fn export_record(&self, wallet_id: &Uuid) -> Result<WalletRecord, WalletError> {
        self.record(wallet_id).await
    }

    /// Import a sealed record produced by `export_record`
    ///
    /// The record is stored as-is; it is not unlocked, so a wrong password
    /// only surfaces on first use.
    ///
    /// # Errors
    /// * `WalletError::DuplicateWallet` - A record with the same id exists
    /// * `WalletError::CorruptRecord` - Empty ciphertext or no addresses
    pub async fn import_record(&self, record: WalletRecord) -> Result<Uuid, WalletError> {
        if record.ciphertext.is_empty() || record.public_addresses.is_empty() {
            return Err(WalletError::CorruptRecord(format!(
                "record {} has no sealed keys",
                record.wallet_id
            )));
        }
        let wallet_id = record.wallet_id;
        self.store.insert_new(record).await?;
        info!(wallet_id = %wallet_id, "Wallet record imported");
        Ok(wallet_id)
    }
}
