pub mod chain;
pub mod config;
pub mod derivation;
pub mod domain;
pub mod errors;
pub mod wallet_info;
pub mod wallet_manager;

pub use chain::{ChainFamily, ChainId};
pub use errors::WalletError;
pub use wallet_info::{CreatedWallet, WalletRecord, WalletSummary};
pub use wallet_manager::WalletManager;
