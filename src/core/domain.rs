//! Key material types.
//!
//! Everything secret in here is zeroized on drop and prints as
//! `[REDACTED]` through `Debug`.

use secrecy::{ExposeSecret, Secret};
use std::collections::BTreeMap;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::core::chain::ChainId;

/// Private key wrapper (32 bytes) with secrecy::Secret for automatic zeroization and display-hiding.
///
/// Holds a secp256k1 scalar for EVM chains and an Ed25519 seed for Solana.
pub struct PrivateKey(Secret<[u8; 32]>);

impl PrivateKey {
    pub fn new(k: [u8; 32]) -> Self {
        Self(Secret::new(k))
    }

    /// Scoped access to the underlying secret bytes.
    pub fn with_secret<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[u8; 32]) -> R,
    {
        f(self.0.expose_secret())
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret().ct_eq(other.0.expose_secret()).into()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

/// 64-byte BIP-39 seed, zeroized on drop.
pub struct Seed(Zeroizing<[u8; 64]>);

impl Seed {
    pub fn new(bytes: [u8; 64]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed").field("bytes", &"[REDACTED]").finish()
    }
}

/// Key material for one chain of one wallet.
#[derive(Debug, PartialEq, Eq)]
pub struct ChainKeypair {
    pub chain: ChainId,
    pub derivation_path: String,
    pub public_address: String,
    pub private_key: PrivateKey,
}

/// Full key set of a wallet, one entry per chain.
pub type KeySet = BTreeMap<ChainId, ChainKeypair>;

/// Public addresses of a key set.
pub fn public_addresses(keys: &KeySet) -> BTreeMap<ChainId, String> {
    keys.iter().map(|(chain, kp)| (*chain, kp.public_address.clone())).collect()
}
