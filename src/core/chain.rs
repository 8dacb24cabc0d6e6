//! Supported chains and their per-chain constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::WalletError;

/// Key scheme and transaction format shared by a group of chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainFamily {
    /// secp256k1 keys, keccak addresses, RLP transactions.
    Evm,
    /// Ed25519 keys, base58 addresses, Solana wire format.
    Solana,
}

/// Closed set of chains this wallet can hold keys for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    Ethereum,
    Polygon,
    Bnb,
    Solana,
}

impl ChainId {
    /// Every supported chain, in display order.
    pub const ALL: [ChainId; 4] = [
        ChainId::Ethereum,
        ChainId::Polygon,
        ChainId::Bnb,
        ChainId::Solana,
    ];

    pub fn family(self) -> ChainFamily {
        match self {
            ChainId::Ethereum | ChainId::Polygon | ChainId::Bnb => ChainFamily::Evm,
            ChainId::Solana => ChainFamily::Solana,
        }
    }

    /// Number of decimal places between the smallest unit and one native coin.
    ///
    /// wei → ETH/MATIC/BNB is 10^18, lamports → SOL is 10^9.
    pub fn decimals(self) -> u32 {
        match self.family() {
            ChainFamily::Evm => 18,
            ChainFamily::Solana => 9,
        }
    }

    /// EIP-155 chain id for EVM chains.
    pub fn evm_chain_id(self) -> Option<u64> {
        match self {
            ChainId::Ethereum => Some(1),
            ChainId::Polygon => Some(137),
            ChainId::Bnb => Some(56),
            ChainId::Solana => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChainId::Ethereum => "ethereum",
            ChainId::Polygon => "polygon",
            ChainId::Bnb => "bnb",
            ChainId::Solana => "solana",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainId {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ethereum" | "eth" => Ok(ChainId::Ethereum),
            "polygon" | "matic" => Ok(ChainId::Polygon),
            "bnb" | "bsc" => Ok(ChainId::Bnb),
            "solana" | "sol" => Ok(ChainId::Solana),
            other => Err(WalletError::Config(format!("unsupported chain: {}", other))),
        }
    }
}
