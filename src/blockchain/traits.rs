use async_trait::async_trait;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::U256;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::blockchain::solana::SolanaMessage;
use crate::core::chain::ChainId;
use crate::core::domain::{ChainKeypair, PrivateKey, Seed};
use crate::core::errors::{DerivationError, RpcError, WalletError};

/// Chain state needed to build a transfer, fetched from the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionParams {
    Evm { nonce: u64, gas_price: U256 },
    Solana { recent_blockhash: String },
}

/// Unsigned, chain-native transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTransaction {
    Evm(TypedTransaction),
    Solana(SolanaMessage),
}

/// Wire-ready signed transaction plus its locally computed hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub chain: ChainId,
    pub bytes: Vec<u8>,
    pub hash: String,
}

/// Defines the node-facing interface for one chain.
///
/// Implementations perform a single attempt per call. Retry policy, if any,
/// belongs to the caller.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Raw JSON-RPC `result` of the chain's balance call.
    async fn get_balance(&self, address: &str) -> Result<serde_json::Value, RpcError>;

    /// Nonce and gas price (EVM) or a recent blockhash (Solana).
    async fn get_transaction_params(&self, address: &str) -> Result<TransactionParams, RpcError>;

    /// Broadcasts signed wire bytes and returns the node-reported hash.
    async fn submit(&self, signed: &[u8]) -> Result<String, RpcError>;
}

/// Per-chain key, address, and transaction logic.
///
/// Everything except `submit` is pure and performs no I/O.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    fn chain(&self) -> ChainId;

    /// BIP-44 / SLIP-0010 path this adapter derives at.
    fn derivation_path(&self) -> &'static str;

    /// Derives this chain's keypair from the wallet seed.
    fn derive_keypair(&self, seed: &Seed) -> Result<ChainKeypair, DerivationError>;

    /// Chain-encoded public address of a private key.
    fn encode_address(&self, key: &PrivateKey) -> Result<String, DerivationError>;

    /// Fails with `InvalidDestination` when `address` is not valid on this chain.
    fn validate_address(&self, address: &str) -> Result<(), WalletError>;

    /// Builds an unsigned native-coin transfer from `from` to `to`.
    fn build_transaction(
        &self,
        from: &ChainKeypair,
        to: &str,
        amount: Decimal,
        params: &TransactionParams,
    ) -> Result<RawTransaction, WalletError>;

    fn sign_transaction(
        &self,
        raw: &RawTransaction,
        key: &PrivateKey,
    ) -> Result<SignedTransaction, WalletError>;

    /// Whether `sign_message` can succeed on this chain.
    fn supports_message_signing(&self) -> bool {
        true
    }

    /// Signs an arbitrary message with the chain's message-signing standard.
    fn sign_message(&self, message: &[u8], key: &PrivateKey) -> Result<String, WalletError>;

    /// Decodes the raw `get_balance` result into whole native coins.
    fn decode_balance(&self, response: &serde_json::Value) -> Result<Decimal, WalletError>;

    /// Broadcasts through `rpc`. Any RPC failure becomes `SubmissionFailed`.
    async fn submit(
        &self,
        rpc: &dyn RpcClient,
        signed: &SignedTransaction,
    ) -> Result<String, WalletError> {
        let chain = self.chain();
        let node_hash = rpc
            .submit(&signed.bytes)
            .await
            .map_err(|cause| WalletError::SubmissionFailed { chain, cause })?;

        if !node_hash.eq_ignore_ascii_case(&signed.hash) {
            warn!(chain = %chain, local = %signed.hash, node = %node_hash, "Node reported a different transaction hash");
        }
        info!(chain = %chain, tx_hash = %node_hash, "Transaction submitted");
        Ok(node_hash)
    }
}

/// Shorthand for the error raised when params of the wrong family reach an adapter.
pub(crate) fn params_mismatch(chain: ChainId) -> WalletError {
    WalletError::Network {
        chain,
        cause: RpcError::InvalidResponse("transaction params belong to another chain family".into()),
    }
}

/// Shorthand for a raw transaction handed to the wrong adapter.
pub(crate) fn foreign_transaction(chain: ChainId) -> WalletError {
    WalletError::UnsupportedOperation {
        chain,
        operation: "sign a transaction built for another chain family".into(),
    }
}
