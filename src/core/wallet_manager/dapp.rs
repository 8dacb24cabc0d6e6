//! DApp connection handshake
//!
//! A connection only discloses public addresses. No password is taken and
//! nothing about the session is persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use super::WalletManager;
use crate::core::{chain::ChainId, errors::WalletError};

/// What the DApp presents when asking to connect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DAppSession {
    /// Requesting origin, e.g. `https://app.uniswap.org`.
    pub origin: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Chains the DApp wants addresses for. Empty means all the wallet holds.
    #[serde(default)]
    pub requested_chains: Vec<ChainId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DAppConnection {
    pub connected: bool,
    pub addresses: BTreeMap<ChainId, String>,
}

impl WalletManager {
    /// Connect a wallet to a DApp
    ///
    /// # Errors
    /// * `WalletError::WalletNotFound` - Unknown id
    /// * `WalletError::InvalidSession` - Missing or malformed origin
    /// * `WalletError::UnsupportedOperation` - A requested chain the wallet has no key for
    pub async fn connect_to_dapp(
        &self,
        wallet_id: &Uuid,
        session: &DAppSession,
    ) -> Result<DAppConnection, WalletError> {
        let record = self.record(wallet_id).await?;

        let origin = session.origin.trim();
        if origin.is_empty() {
            return Err(WalletError::InvalidSession("origin is required".into()));
        }
        reqwest::Url::parse(origin)
            .map_err(|e| WalletError::InvalidSession(format!("bad origin {}: {}", origin, e)))?;

        let addresses = if session.requested_chains.is_empty() {
            record.public_addresses.clone()
        } else {
            let mut selected = BTreeMap::new();
            for chain in &session.requested_chains {
                Self::require_chain(&record, *chain)?;
                selected.insert(*chain, record.public_addresses[chain].clone());
            }
            selected
        };

        info!(
            wallet_id = %wallet_id,
            origin,
            dapp = session.name.as_deref().unwrap_or("-"),
            chains = addresses.len(),
            "DApp connected"
        );
        Ok(DAppConnection { connected: true, addresses })
    }
}
