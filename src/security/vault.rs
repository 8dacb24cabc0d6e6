//! Encrypted key vault.
//!
//! A wallet's key set is sealed into a single self-describing blob:
//!
//! ```text
//! version(1) ‖ m_cost(4 LE) ‖ t_cost(4 LE) ‖ p_cost(4 LE) ‖ salt(16) ‖ nonce(12) ‖ ciphertext+tag
//! ```
//!
//! The key is Argon2id(password, salt) with the embedded cost parameters, the
//! cipher is AES-256-GCM, and the wallet UUID is bound as associated data so a
//! blob cannot be replayed under another wallet id.
//!
//! Failure mapping:
//! - structural defects found before any password-dependent work → `CorruptRecord`
//! - authentication failure or an undecodable plaintext → `WrongPassword`

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::core::chain::ChainId;
use crate::core::config::SecurityConfig;
use crate::core::domain::{public_addresses, ChainKeypair, KeySet, PrivateKey};
use crate::core::errors::VaultError;
use crate::core::wallet_info::WalletRecord;
use crate::security::redaction::redact_bytes;

/// Current blob format.
pub const VAULT_VERSION: u8 = 1;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + 4 + 4 + 4 + SALT_LEN + NONCE_LEN;

/// Upper bounds accepted when reading a stored blob.
const MAX_M_COST_KIB: u32 = 1 << 20;
const MAX_T_COST: u32 = 64;
const MAX_P_COST: u32 = 16;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl KdfParams {
    fn in_range(&self) -> bool {
        self.m_cost <= MAX_M_COST_KIB && self.t_cost <= MAX_T_COST && self.p_cost <= MAX_P_COST
    }

    fn argon2_params(&self) -> Result<Params, argon2::Error> {
        Params::new(self.m_cost, self.t_cost, self.p_cost, Some(32))
    }

    /// Checks that Argon2 accepts these parameters and they stay within the
    /// bounds `unlock` enforces on stored blobs.
    pub fn validate(&self) -> Result<(), VaultError> {
        if !self.in_range() {
            return Err(VaultError::Encryption(format!("kdf parameters out of range: {:?}", self)));
        }
        self.argon2_params()
            .map(|_| ())
            .map_err(|e| VaultError::Encryption(format!("kdf parameters rejected: {}", e)))
    }

    /// Argon2id 派生，CPU 密集，调用方需在阻塞线程池中执行
    fn derive_key(&self, password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>, argon2::Error> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.argon2_params()?);
        let mut key = Zeroizing::new([0u8; 32]);
        argon2.hash_password_into(password.as_bytes(), salt, &mut key[..])?;
        Ok(key)
    }
}

impl From<&SecurityConfig> for KdfParams {
    fn from(config: &SecurityConfig) -> Self {
        Self {
            m_cost: config.argon2_memory_kib,
            t_cost: config.argon2_iterations,
            p_cost: config.argon2_parallelism,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::from(&SecurityConfig::default())
    }
}

/// Seals key sets into `WalletRecord`s and opens them again.
///
/// Plaintext returned by `unlock`/`unlock_chain` is zeroized when dropped and
/// must not outlive the operation that requested it.
pub trait KeyVault: Send + Sync {
    fn seal(&self, wallet_id: Uuid, keys: &KeySet, password: &str)
        -> Result<WalletRecord, VaultError>;

    fn unlock(&self, record: &WalletRecord, password: &str) -> Result<KeySet, VaultError>;

    /// Unlocks and keeps only `chain`'s keypair. The rest are dropped before returning.
    fn unlock_chain(
        &self,
        record: &WalletRecord,
        password: &str,
        chain: ChainId,
    ) -> Result<ChainKeypair, VaultError> {
        let mut keys = self.unlock(record, password)?;
        keys.remove(&chain)
            .ok_or_else(|| VaultError::CorruptRecord(format!("no sealed key for {}", chain)))
    }
}

/// Serialized form of one keypair inside the sealed payload.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct SealedKeypair {
    #[zeroize(skip)]
    chain: ChainId,
    derivation_path: String,
    public_address: String,
    private_key: [u8; 32],
}

impl SealedKeypair {
    fn from_keypair(kp: &ChainKeypair) -> Self {
        Self {
            chain: kp.chain,
            derivation_path: kp.derivation_path.clone(),
            public_address: kp.public_address.clone(),
            private_key: kp.private_key.with_secret(|bytes| *bytes),
        }
    }

    fn to_keypair(&self) -> ChainKeypair {
        ChainKeypair {
            chain: self.chain,
            derivation_path: self.derivation_path.clone(),
            public_address: self.public_address.clone(),
            private_key: PrivateKey::new(self.private_key),
        }
    }
}

struct BlobHeader<'a> {
    params: KdfParams,
    salt: &'a [u8],
    nonce: &'a [u8],
    body: &'a [u8],
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

/// Splits a blob, rejecting anything structurally wrong before any KDF work.
fn parse_blob(blob: &[u8]) -> Result<BlobHeader<'_>, VaultError> {
    if blob.len() < HEADER_LEN + TAG_LEN {
        return Err(VaultError::CorruptRecord(format!(
            "blob too short: {} bytes",
            blob.len()
        )));
    }
    if blob[0] != VAULT_VERSION {
        return Err(VaultError::CorruptRecord(format!("unknown vault version {}", blob[0])));
    }

    let params = KdfParams {
        m_cost: read_u32_le(&blob[1..5]),
        t_cost: read_u32_le(&blob[5..9]),
        p_cost: read_u32_le(&blob[9..13]),
    };
    if !params.in_range() || params.argon2_params().is_err() {
        return Err(VaultError::CorruptRecord(format!("kdf parameters out of range: {:?}", params)));
    }

    let salt_end = 13 + SALT_LEN;
    Ok(BlobHeader {
        params,
        salt: &blob[13..salt_end],
        nonce: &blob[salt_end..HEADER_LEN],
        body: &blob[HEADER_LEN..],
    })
}

/// Argon2id + AES-256-GCM vault.
#[derive(Debug, Clone)]
pub struct EncryptedVault {
    params: KdfParams,
}

impl EncryptedVault {
    pub fn new(params: KdfParams) -> Result<Self, VaultError> {
        params.validate()?;
        Ok(Self { params })
    }
}

impl KeyVault for EncryptedVault {
    fn seal(
        &self,
        wallet_id: Uuid,
        keys: &KeySet,
        password: &str,
    ) -> Result<WalletRecord, VaultError> {
        if keys.is_empty() {
            return Err(VaultError::Encryption("nothing to seal".into()));
        }

        let payload: Vec<SealedKeypair> = keys.values().map(SealedKeypair::from_keypair).collect();
        let plaintext = Zeroizing::new(
            bincode::serialize(&payload)
                .map_err(|e| VaultError::Encryption(format!("serialize keys: {}", e)))?,
        );
        drop(payload);

        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);

        let key = self
            .params
            .derive_key(password, &salt)
            .map_err(|e| VaultError::Encryption(format!("key derivation: {}", e)))?;
        let cipher = Aes256Gcm::new_from_slice(&key[..])
            .map_err(|_| VaultError::Encryption("invalid key length".into()))?;
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload { msg: plaintext.as_slice(), aad: wallet_id.as_bytes() },
            )
            .map_err(|_| VaultError::Encryption("aead encryption failed".into()))?;

        let mut blob = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        blob.push(VAULT_VERSION);
        blob.extend_from_slice(&self.params.m_cost.to_le_bytes());
        blob.extend_from_slice(&self.params.t_cost.to_le_bytes());
        blob.extend_from_slice(&self.params.p_cost.to_le_bytes());
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        debug!(wallet_id = %wallet_id, blob = %redact_bytes(&blob), "Sealed wallet keys");
        Ok(WalletRecord {
            wallet_id,
            ciphertext: blob,
            public_addresses: public_addresses(keys),
            created_at: Utc::now(),
        })
    }

    fn unlock(&self, record: &WalletRecord, password: &str) -> Result<KeySet, VaultError> {
        let header = parse_blob(&record.ciphertext)?;

        // parse_blob already proved the params valid, so this cannot fail on input
        let key = header
            .params
            .derive_key(password, header.salt)
            .map_err(|e| VaultError::CorruptRecord(format!("key derivation: {}", e)))?;
        let cipher = Aes256Gcm::new_from_slice(&key[..])
            .map_err(|_| VaultError::Encryption("invalid key length".into()))?;

        let plaintext = Zeroizing::new(
            cipher
                .decrypt(
                    Nonce::from_slice(header.nonce),
                    Payload { msg: header.body, aad: record.wallet_id.as_bytes() },
                )
                .map_err(|_| VaultError::WrongPassword)?,
        );
        let sealed: Vec<SealedKeypair> =
            bincode::deserialize(&plaintext).map_err(|_| VaultError::WrongPassword)?;

        let mut keys = KeySet::new();
        for entry in &sealed {
            if keys.insert(entry.chain, entry.to_keypair()).is_some() {
                return Err(VaultError::CorruptRecord(format!("{} sealed twice", entry.chain)));
            }
        }

        if public_addresses(&keys) != record.public_addresses {
            warn!(wallet_id = %record.wallet_id, "Public addresses disagree with sealed keys");
            return Err(VaultError::CorruptRecord(
                "public addresses do not match sealed keys".into(),
            ));
        }
        Ok(keys)
    }
}
