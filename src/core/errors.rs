//! Error types for wallet operations.
//!
//! `WalletError` is the only error type that crosses the public surface.
//! Component-level errors (`DerivationError`, `VaultError`, `RpcError`) are
//! folded into it through `From` conversions so callers can branch on one
//! flat taxonomy.

use thiserror::Error;

use crate::core::chain::ChainId;

/// Errors raised by the derivation engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DerivationError {
    /// Mnemonic failed wordlist or checksum validation.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// A derivation step produced an unusable key.
    #[error("key derivation failed: {0}")]
    DerivationFailure(String),
}

/// Errors raised by the encrypted vault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Authentication failed or the decrypted payload did not decode.
    ///
    /// Both causes map here on purpose so the two cannot be told apart.
    #[error("wrong password")]
    WrongPassword,

    /// The stored blob is structurally malformed independent of any password.
    #[error("corrupt wallet record: {0}")]
    CorruptRecord(String),

    /// Sealing failed (cipher or KDF setup).
    #[error("encryption failed: {0}")]
    Encryption(String),
}

/// Errors raised by an RPC collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Transport-level failure (connect, timeout, HTTP status).
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("node rejected request: {0}")]
    Rejected(String),

    /// The node answered with something we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by the wallet core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("key derivation failed: {0}")]
    DerivationFailure(String),

    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    #[error("wallet already exists: {0}")]
    DuplicateWallet(String),

    #[error("wrong password")]
    WrongPassword,

    #[error("corrupt wallet record: {0}")]
    CorruptRecord(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("invalid destination for {chain}: {reason}")]
    InvalidDestination { chain: ChainId, reason: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("unsupported operation on {chain}: {operation}")]
    UnsupportedOperation { chain: ChainId, operation: String },

    #[error("submission to {chain} failed: {cause}")]
    SubmissionFailed {
        chain: ChainId,
        #[source]
        cause: RpcError,
    },

    #[error("network error on {chain}: {cause}")]
    Network {
        chain: ChainId,
        #[source]
        cause: RpcError,
    },

    #[error("invalid dapp session: {0}")]
    InvalidSession(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl WalletError {
    /// Whether retrying the same call could plausibly succeed.
    ///
    /// Only network-side failures qualify; derivation and vault errors
    /// reflect caller input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WalletError::Network { .. } | WalletError::SubmissionFailed { .. }
        )
    }
}

impl From<DerivationError> for WalletError {
    fn from(err: DerivationError) -> Self {
        match err {
            DerivationError::InvalidMnemonic(msg) => WalletError::InvalidMnemonic(msg),
            DerivationError::DerivationFailure(msg) => WalletError::DerivationFailure(msg),
        }
    }
}

impl From<VaultError> for WalletError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::WrongPassword => WalletError::WrongPassword,
            VaultError::CorruptRecord(msg) => WalletError::CorruptRecord(msg),
            VaultError::Encryption(msg) => WalletError::Encryption(msg),
        }
    }
}

impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        WalletError::Storage(err.to_string())
    }
}
