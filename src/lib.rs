#![allow(clippy::doc_lazy_continuation)]
// src/lib.rs
//! Multi-chain wallet core.
//!
//! One BIP-39 mnemonic derives keys for Ethereum, Polygon, BNB Smart Chain
//! and Solana. Keys are sealed at rest under Argon2id + AES-256-GCM and only
//! unlocked for the duration of a single signing operation.

pub mod blockchain;
pub mod cli;
pub mod core;
pub mod security;
pub mod storage;

pub use crate::blockchain::{adapter_for, ChainAdapter, RpcClient, TransactionParams};
pub use crate::core::config::WalletConfig;
pub use crate::core::errors::{DerivationError, RpcError, VaultError, WalletError};
pub use crate::core::wallet_manager::{
    DAppConnection, DAppSession, SendRequest, SentTransaction, SignedMessage, WalletManager,
};
pub use crate::core::{ChainId, CreatedWallet, WalletRecord, WalletSummary};
