//! Solana: SLIP-0010 Ed25519 keys, base58 addresses, legacy transfer messages.

pub mod client;
pub mod transaction;

pub use client::SolanaRpcClient;
pub use transaction::SolanaMessage;

use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey};
use rust_decimal::Decimal;
use tracing::debug;

use super::traits::{
    foreign_transaction, params_mismatch, ChainAdapter, RawTransaction, SignedTransaction,
    TransactionParams,
};
use super::units;
use crate::core::chain::ChainId;
use crate::core::derivation::{derive_ed25519, paths};
use crate::core::domain::{ChainKeypair, PrivateKey, Seed};
use crate::core::errors::{DerivationError, RpcError, WalletError};

#[derive(Debug, Clone, Copy, Default)]
pub struct SolanaAdapter;

impl SolanaAdapter {
    fn decode_pubkey(address: &str) -> Result<[u8; 32], WalletError> {
        let invalid = |reason: String| WalletError::InvalidDestination {
            chain: ChainId::Solana,
            reason,
        };
        let bytes = bs58::decode(address)
            .into_vec()
            .map_err(|e| invalid(format!("not base58: {}", e)))?;
        let key = <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| invalid(format!("expected 32 bytes, got {}", bytes.len())))?;
        if key == transaction::SYSTEM_PROGRAM_ID {
            return Err(invalid("System Program cannot receive transfers".into()));
        }
        Ok(key)
    }

    fn signing_key(key: &PrivateKey) -> SigningKey {
        key.with_secret(SigningKey::from_bytes)
    }
}

#[async_trait]
impl ChainAdapter for SolanaAdapter {
    fn chain(&self) -> ChainId {
        ChainId::Solana
    }

    fn derivation_path(&self) -> &'static str {
        paths::SOLANA
    }

    fn derive_keypair(&self, seed: &Seed) -> Result<ChainKeypair, DerivationError> {
        let path = self.derivation_path();
        let private_key = derive_ed25519(seed, path)?;
        let public_address = self.encode_address(&private_key)?;
        Ok(ChainKeypair {
            chain: ChainId::Solana,
            derivation_path: path.to_string(),
            public_address,
            private_key,
        })
    }

    fn encode_address(&self, key: &PrivateKey) -> Result<String, DerivationError> {
        let verifying_key = Self::signing_key(key).verifying_key();
        Ok(bs58::encode(verifying_key.as_bytes()).into_string())
    }

    fn validate_address(&self, address: &str) -> Result<(), WalletError> {
        Self::decode_pubkey(address).map(|_| ())
    }

    fn build_transaction(
        &self,
        from: &ChainKeypair,
        to: &str,
        amount: Decimal,
        params: &TransactionParams,
    ) -> Result<RawTransaction, WalletError> {
        let to = Self::decode_pubkey(to)?;
        // bounded to u64 by to_smallest_unit for this chain
        let lamports = u64::try_from(units::to_smallest_unit(ChainId::Solana, amount)?)
            .map_err(|_| WalletError::InvalidAmount(format!("{} overflows lamports", amount)))?;
        let blockhash = match params {
            TransactionParams::Solana { recent_blockhash } => recent_blockhash,
            TransactionParams::Evm { .. } => return Err(params_mismatch(ChainId::Solana)),
        };
        let recent_blockhash = bs58::decode(blockhash)
            .into_vec()
            .ok()
            .and_then(|b| <[u8; 32]>::try_from(b.as_slice()).ok())
            .ok_or_else(|| WalletError::Network {
                chain: ChainId::Solana,
                cause: RpcError::InvalidResponse(format!("bad blockhash {}", blockhash)),
            })?;
        let from = bs58::decode(&from.public_address)
            .into_vec()
            .ok()
            .and_then(|b| <[u8; 32]>::try_from(b.as_slice()).ok())
            .ok_or_else(|| WalletError::DerivationFailure("bad sender address".into()))?;

        debug!(lamports, "Built Solana transfer");
        Ok(RawTransaction::Solana(SolanaMessage { from, to, lamports, recent_blockhash }))
    }

    fn sign_transaction(
        &self,
        raw: &RawTransaction,
        key: &PrivateKey,
    ) -> Result<SignedTransaction, WalletError> {
        let message = match raw {
            RawTransaction::Solana(message) => message,
            RawTransaction::Evm(_) => return Err(foreign_transaction(ChainId::Solana)),
        };

        let signing_key = Self::signing_key(key);
        if signing_key.verifying_key().to_bytes() != message.from {
            return Err(WalletError::DerivationFailure(
                "signing key does not match the fee payer".into(),
            ));
        }

        let message_bytes = message.serialize();
        let signature = signing_key.sign(&message_bytes).to_bytes();
        Ok(SignedTransaction {
            chain: ChainId::Solana,
            bytes: transaction::encode_transaction(&signature, &message_bytes),
            hash: bs58::encode(signature).into_string(),
        })
    }

    fn supports_message_signing(&self) -> bool {
        false
    }

    fn sign_message(&self, _message: &[u8], _key: &PrivateKey) -> Result<String, WalletError> {
        Err(WalletError::UnsupportedOperation {
            chain: ChainId::Solana,
            operation: "sign_message".into(),
        })
    }

    /// `getBalance` result: `{ "context": .., "value": <lamports> }`.
    fn decode_balance(&self, response: &serde_json::Value) -> Result<Decimal, WalletError> {
        let lamports = response.get("value").and_then(serde_json::Value::as_u64).ok_or_else(|| {
            WalletError::Network {
                chain: ChainId::Solana,
                cause: RpcError::InvalidResponse(format!("expected {{value: u64}}, got {}", response)),
            }
        })?;
        units::from_smallest_unit(ChainId::Solana, lamports as u128)
    }
}
