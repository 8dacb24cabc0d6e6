use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::core::chain::ChainId;
use crate::core::errors::WalletError;

/// Vault key-derivation settings (Argon2id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB
    #[serde(default = "SecurityConfig::default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count
    #[serde(default = "SecurityConfig::default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 lanes
    #[serde(default = "SecurityConfig::default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

impl SecurityConfig {
    fn default_argon2_memory_kib() -> u32 { 19_456 }
    fn default_argon2_iterations() -> u32 { 2 }
    fn default_argon2_parallelism() -> u32 { 1 }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_kib: Self::default_argon2_memory_kib(),
            argon2_iterations: Self::default_argon2_iterations(),
            argon2_parallelism: Self::default_argon2_parallelism(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON record per wallet (file-backed store only)
    #[serde(default = "StorageConfig::default_wallet_dir")]
    pub wallet_dir: PathBuf,
}

impl StorageConfig {
    fn default_wallet_dir() -> PathBuf {
        PathBuf::from("./wallets")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { wallet_dir: Self::default_wallet_dir() }
    }
}

/// Blockchain network configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
}

/// wallet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// chain name → network, keyed by the names `ChainId` parses
    #[serde(default = "WalletConfig::default_networks")]
    pub networks: HashMap<String, NetworkConfig>,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl WalletConfig {
    fn default_networks() -> HashMap<String, NetworkConfig> {
        let mut networks = HashMap::with_capacity(4);
        for (chain, url) in [
            (ChainId::Ethereum, "https://eth.llamarpc.com"),
            (ChainId::Polygon, "https://polygon-rpc.com"),
            (ChainId::Bnb, "https://bsc-dataseed.binance.org"),
            (ChainId::Solana, "https://api.mainnet-beta.solana.com"),
        ] {
            networks.insert(chain.to_string(), NetworkConfig { rpc_url: url.to_string() });
        }
        networks
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, WalletError> {
        toml::from_str(s).map_err(|e| WalletError::Config(format!("invalid config: {}", e)))
    }

    /// Read a TOML file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, WalletError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            WalletError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override RPC endpoints from `WALLET_<CHAIN>_RPC_URL`.
    pub fn apply_env_overrides(&mut self) {
        for chain in ChainId::ALL {
            let var = format!("WALLET_{}_RPC_URL", chain.as_str().to_ascii_uppercase());
            if let Ok(url) = std::env::var(&var) {
                let url = url.trim();
                if !url.is_empty() {
                    // the file may name this chain by an alias
                    self.networks
                        .retain(|name, _| name.parse::<ChainId>().map_or(true, |c| c != chain));
                    self.networks
                        .insert(chain.to_string(), NetworkConfig { rpc_url: url.to_string() });
                }
            }
        }
    }

    /// Validate and key the configured networks by chain.
    ///
    /// Fails on unknown chain names, duplicate aliases, or unparseable URLs.
    pub fn resolved_networks(&self) -> Result<BTreeMap<ChainId, NetworkConfig>, WalletError> {
        if self.networks.is_empty() {
            return Err(WalletError::Config("no networks configured".into()));
        }

        let mut resolved = BTreeMap::new();
        for (name, network) in &self.networks {
            let chain: ChainId = name.parse()?;
            reqwest::Url::parse(network.rpc_url.trim()).map_err(|e| {
                WalletError::Config(format!("invalid rpc_url for {}: {}", chain, e))
            })?;
            if resolved.insert(chain, network.clone()).is_some() {
                return Err(WalletError::Config(format!("{} configured twice", chain)));
            }
        }
        Ok(resolved)
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            networks: Self::default_networks(),
            security: SecurityConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}
