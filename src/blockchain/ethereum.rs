use async_trait::async_trait;
use ethers::{
    core::k256::ecdsa::SigningKey,
    providers::{Http, Middleware, Provider, ProviderError, RpcError as _},
    signers::{LocalWallet, Signer},
    types::{
        transaction::eip2718::TypedTransaction, Address, BlockNumber, Bytes, TransactionRequest,
        U256,
    },
    utils::{hash_message, keccak256, secret_key_to_address, to_checksum},
};
use rust_decimal::Decimal;
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

use super::traits::{
    foreign_transaction, params_mismatch, ChainAdapter, RawTransaction, RpcClient,
    SignedTransaction, TransactionParams,
};
use super::units;
use crate::core::chain::ChainId;
use crate::core::derivation::{derive_secp256k1, paths};
use crate::core::domain::{ChainKeypair, PrivateKey, Seed};
use crate::core::errors::{DerivationError, RpcError, WalletError};

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Adapter for an EVM chain. Every EVM chain shares the same key and
/// address; only the EIP-155 chain id differs.
#[derive(Debug, Clone, Copy)]
pub struct EvmAdapter {
    chain: ChainId,
}

impl EvmAdapter {
    pub const fn new(chain: ChainId) -> Self {
        Self { chain }
    }

    fn chain_id(&self) -> u64 {
        // EvmAdapter is only ever constructed for EVM chains
        self.chain.evm_chain_id().unwrap_or_default()
    }

    fn local_wallet(&self, key: &PrivateKey) -> Result<LocalWallet, WalletError> {
        let wallet = key
            .with_secret(|bytes| LocalWallet::from_bytes(bytes))
            .map_err(|e| WalletError::DerivationFailure(format!("invalid secp256k1 key: {}", e)))?;
        Ok(wallet.with_chain_id(self.chain_id()))
    }

    fn parse_address(&self, address: &str) -> Result<Address, WalletError> {
        let invalid = |reason: &str| WalletError::InvalidDestination {
            chain: self.chain,
            reason: reason.to_string(),
        };

        let digits = address.strip_prefix("0x").ok_or_else(|| invalid("missing 0x prefix"))?;
        if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("expected 20 hex-encoded bytes"));
        }
        let parsed = Address::from_str(address).map_err(|e| invalid(&e.to_string()))?;

        // Mixed case means the sender opted into EIP-55 and it must match
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        if has_upper && has_lower && to_checksum(&parsed, None) != address {
            return Err(invalid("EIP-55 checksum mismatch"));
        }
        Ok(parsed)
    }
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
    fn chain(&self) -> ChainId {
        self.chain
    }

    fn derivation_path(&self) -> &'static str {
        paths::EVM
    }

    fn derive_keypair(&self, seed: &Seed) -> Result<ChainKeypair, DerivationError> {
        let path = self.derivation_path();
        let private_key = derive_secp256k1(seed, path)?;
        let public_address = self.encode_address(&private_key)?;
        Ok(ChainKeypair {
            chain: self.chain,
            derivation_path: path.to_string(),
            public_address,
            private_key,
        })
    }

    fn encode_address(&self, key: &PrivateKey) -> Result<String, DerivationError> {
        let signing_key = key
            .with_secret(|bytes| SigningKey::from_slice(&bytes[..]))
            .map_err(|e| DerivationError::DerivationFailure(format!("invalid secp256k1 key: {}", e)))?;
        Ok(to_checksum(&secret_key_to_address(&signing_key), None))
    }

    fn validate_address(&self, address: &str) -> Result<(), WalletError> {
        self.parse_address(address).map(|_| ())
    }

    fn build_transaction(
        &self,
        from: &ChainKeypair,
        to: &str,
        amount: Decimal,
        params: &TransactionParams,
    ) -> Result<RawTransaction, WalletError> {
        let to_address = self.parse_address(to)?;
        let value = U256::from(units::to_smallest_unit(self.chain, amount)?);
        let (nonce, gas_price) = match params {
            TransactionParams::Evm { nonce, gas_price } => (*nonce, *gas_price),
            TransactionParams::Solana { .. } => return Err(params_mismatch(self.chain)),
        };
        let from_address = Address::from_str(&from.public_address)
            .map_err(|e| WalletError::DerivationFailure(format!("bad sender address: {}", e)))?;

        let tx = TransactionRequest::new()
            .from(from_address)
            .to(to_address)
            .value(value)
            .gas(TRANSFER_GAS_LIMIT)
            .gas_price(gas_price)
            .nonce(nonce)
            .chain_id(self.chain_id());

        debug!(chain = %self.chain, nonce, gas_price = %gas_price, "Built legacy transfer");
        Ok(RawTransaction::Evm(TypedTransaction::Legacy(tx)))
    }

    fn sign_transaction(
        &self,
        raw: &RawTransaction,
        key: &PrivateKey,
    ) -> Result<SignedTransaction, WalletError> {
        let tx = match raw {
            RawTransaction::Evm(tx) => tx,
            RawTransaction::Solana(_) => return Err(foreign_transaction(self.chain)),
        };

        let wallet = self.local_wallet(key)?;
        let signature = wallet
            .sign_transaction_sync(tx)
            .map_err(|e| WalletError::DerivationFailure(format!("signing failed: {}", e)))?;
        let bytes = tx.rlp_signed(&signature).to_vec();
        let hash = format!("0x{}", hex::encode(keccak256(&bytes)));

        Ok(SignedTransaction { chain: self.chain, bytes, hash })
    }

    /// EIP-191 personal sign, 65 bytes `r ‖ s ‖ v` as 0x-hex.
    fn sign_message(&self, message: &[u8], key: &PrivateKey) -> Result<String, WalletError> {
        let wallet = self.local_wallet(key)?;
        let signature = wallet
            .sign_hash(hash_message(message))
            .map_err(|e| WalletError::DerivationFailure(format!("signing failed: {}", e)))?;
        Ok(format!("0x{}", hex::encode(signature.to_vec())))
    }

    /// `eth_getBalance` result: hex-encoded wei.
    fn decode_balance(&self, response: &serde_json::Value) -> Result<Decimal, WalletError> {
        let invalid = |reason: String| WalletError::Network {
            chain: self.chain,
            cause: RpcError::InvalidResponse(reason),
        };

        let raw = response
            .as_str()
            .ok_or_else(|| invalid(format!("expected hex string, got {}", response)))?;
        let digits = raw.strip_prefix("0x").unwrap_or(raw);
        let wei = U256::from_str_radix(digits, 16)
            .map_err(|e| invalid(format!("bad hex quantity {}: {}", raw, e)))?;
        if wei > U256::from(u128::MAX) {
            return Err(invalid(format!("balance {} out of range", wei)));
        }
        units::from_smallest_unit(self.chain, wei.as_u128())
    }
}

/// JSON-RPC client for an EVM node, backed by an ethers `Provider<Http>`.
#[derive(Clone)]
pub struct EvmRpcClient {
    chain: ChainId,
    provider: Provider<Http>,
}

impl EvmRpcClient {
    pub fn new(chain: ChainId, rpc_url: &str) -> Result<Self, WalletError> {
        let rpc_url_clean = rpc_url.trim();
        let parsed_url = reqwest::Url::parse(rpc_url_clean).map_err(|e| {
            WalletError::Config(format!("invalid {} rpc url '{}': {}", chain, rpc_url_clean, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| WalletError::Config(format!("failed to build http client: {}", e)))?;

        info!(chain = %chain, url = %parsed_url, "Configured EVM rpc client");
        let provider = Provider::new(Http::new_with_client(parsed_url, client));
        Ok(Self { chain, provider })
    }
}

fn classify(err: ProviderError) -> RpcError {
    if let Some(response) = err.as_error_response() {
        return RpcError::Rejected(response.message.clone());
    }
    match err {
        ProviderError::SerdeJson(e) => RpcError::InvalidResponse(e.to_string()),
        other => RpcError::Transport(other.to_string()),
    }
}

#[async_trait]
impl RpcClient for EvmRpcClient {
    async fn get_balance(&self, address: &str) -> Result<serde_json::Value, RpcError> {
        debug!(chain = %self.chain, address, "eth_getBalance");
        self.provider
            .request::<_, serde_json::Value>("eth_getBalance", (address, "latest"))
            .await
            .map_err(classify)
    }

    async fn get_transaction_params(&self, address: &str) -> Result<TransactionParams, RpcError> {
        let from = Address::from_str(address)
            .map_err(|e| RpcError::InvalidResponse(format!("bad sender address: {}", e)))?;

        let (nonce, gas_price) = futures::try_join!(
            self.provider.get_transaction_count(from, Some(BlockNumber::Pending.into())),
            self.provider.get_gas_price(),
        )
        .map_err(classify)?;

        debug!(chain = %self.chain, nonce = %nonce, gas_price = %gas_price, "Fetched transaction params");
        let nonce = u64::try_from(nonce)
            .map_err(|_| RpcError::InvalidResponse(format!("nonce {} out of range", nonce)))?;
        Ok(TransactionParams::Evm { nonce, gas_price })
    }

    async fn submit(&self, signed: &[u8]) -> Result<String, RpcError> {
        let pending = self
            .provider
            .send_raw_transaction(Bytes::from(signed.to_vec()))
            .await
            .map_err(classify)?;
        Ok(format!("0x{}", hex::encode(pending.tx_hash().as_bytes())))
    }
}
