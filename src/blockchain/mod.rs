pub mod ethereum;
pub mod solana;
pub mod traits;
pub mod units;

use std::sync::Arc;

pub use ethereum::{EvmAdapter, EvmRpcClient};
pub use solana::{SolanaAdapter, SolanaRpcClient};
pub use traits::{ChainAdapter, RawTransaction, RpcClient, SignedTransaction, TransactionParams};

use crate::core::chain::{ChainFamily, ChainId};
use crate::core::config::NetworkConfig;
use crate::core::errors::WalletError;

static ETHEREUM: EvmAdapter = EvmAdapter::new(ChainId::Ethereum);
static POLYGON: EvmAdapter = EvmAdapter::new(ChainId::Polygon);
static BNB: EvmAdapter = EvmAdapter::new(ChainId::Bnb);
static SOLANA: SolanaAdapter = SolanaAdapter;

/// The adapter for `chain`. Adding a `ChainId` variant fails to compile until
/// it is given an adapter here.
pub fn adapter_for(chain: ChainId) -> &'static dyn ChainAdapter {
    match chain {
        ChainId::Ethereum => &ETHEREUM,
        ChainId::Polygon => &POLYGON,
        ChainId::Bnb => &BNB,
        ChainId::Solana => &SOLANA,
    }
}

/// Builds the RPC client for a configured network.
pub fn rpc_client_for(
    chain: ChainId,
    network: &NetworkConfig,
) -> Result<Arc<dyn RpcClient>, WalletError> {
    let client: Arc<dyn RpcClient> = match chain.family() {
        ChainFamily::Evm => Arc::new(EvmRpcClient::new(chain, &network.rpc_url)?),
        ChainFamily::Solana => Arc::new(SolanaRpcClient::new(&network.rpc_url)?),
    };
    Ok(client)
}
