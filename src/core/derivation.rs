//! HD derivation from a BIP-39 mnemonic.
//!
//! ## Supported schemes
//! - secp256k1, BIP-32/BIP-44: Ethereum, Polygon, BNB (`m/44'/60'/0'/0/0`)
//! - Ed25519, SLIP-0010 hardened-only: Solana (`m/44'/501'/0'/0'`)
//!
//! The two schemes share the BIP-39 seed and nothing else. Per-chain key
//! construction lives in each chain adapter; this module owns mnemonic
//! handling, the seed, and the raw tree walks.

use bip39::{Language, Mnemonic};
use coins_bip32::xkeys::{Parent, XPriv};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha512;
use std::collections::BTreeSet;
use tracing::{debug, info};
use zeroize::{Zeroize, Zeroizing};

use crate::blockchain::adapter_for;
use crate::core::chain::ChainId;
use crate::core::domain::{KeySet, PrivateKey, Seed};
use crate::core::errors::DerivationError;

type HmacSha512 = Hmac<Sha512>;

/// Hardened index offset
const HARDENED: u32 = 0x8000_0000;

/// SLIP-0010 master key HMAC key for Ed25519
const ED25519_SEED_KEY: &[u8] = b"ed25519 seed";

/// Canonical derivation paths
pub mod paths {
    /// Shared by every EVM chain.
    pub const EVM: &str = "m/44'/60'/0'/0/0";

    /// Phantom/Solflare-compatible account 0.
    pub const SOLANA: &str = "m/44'/501'/0'/0'";
}

/// Collapse whitespace and lowercase a phrase before validation.
pub fn normalize_mnemonic(phrase: &str) -> Zeroizing<String> {
    Zeroizing::new(
        phrase
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase(),
    )
}

/// Validate a phrase against the English wordlist and its checksum.
pub fn parse_mnemonic(phrase: &str) -> Result<Mnemonic, DerivationError> {
    let normalized = normalize_mnemonic(phrase);
    Mnemonic::parse_in(Language::English, normalized.as_str())
        .map_err(|e| DerivationError::InvalidMnemonic(e.to_string()))
}

/// Generate a fresh English mnemonic of 12 or 24 words.
pub fn generate_mnemonic(word_count: usize) -> Result<Zeroizing<String>, DerivationError> {
    let entropy_len = match word_count {
        12 => 16,
        24 => 32,
        other => {
            return Err(DerivationError::InvalidMnemonic(format!(
                "unsupported word count {}, expected 12 or 24",
                other
            )))
        }
    };

    let mut entropy = Zeroizing::new(vec![0u8; entropy_len]);
    rand::rngs::OsRng.fill_bytes(&mut entropy);

    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| DerivationError::InvalidMnemonic(e.to_string()))?;
    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// BIP-39 mnemonic + passphrase → 64-byte seed.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<Seed, DerivationError> {
    let mnemonic = parse_mnemonic(phrase)?;
    Ok(Seed::new(mnemonic.to_seed(passphrase)))
}

/// Derive one keypair per requested chain.
///
/// Deterministic in (mnemonic, passphrase, chain). Nothing is persisted and
/// the seed is zeroized before returning.
pub fn derive(
    mnemonic: &str,
    passphrase: &str,
    chains: &BTreeSet<ChainId>,
) -> Result<KeySet, DerivationError> {
    if chains.is_empty() {
        return Err(DerivationError::DerivationFailure("no chains requested".into()));
    }

    let seed = mnemonic_to_seed(mnemonic, passphrase)?;
    info!(chains = chains.len(), "Deriving wallet keys");

    let mut keys = KeySet::new();
    for chain in chains {
        let keypair = adapter_for(*chain).derive_keypair(&seed)?;
        debug!(chain = %chain, path = %keypair.derivation_path, "Derived keypair");
        keys.insert(*chain, keypair);
    }
    Ok(keys)
}

/// Parse `m/44'/60'/0'/0/0` into raw child indices.
pub fn parse_path(path: &str) -> Result<Vec<u32>, DerivationError> {
    let mut segments = path.trim().split('/');
    if segments.next() != Some("m") {
        return Err(DerivationError::DerivationFailure(format!(
            "path must start with m/: {}",
            path
        )));
    }

    segments
        .map(|segment| {
            let (digits, hardened) = match segment
                .strip_suffix('\'')
                .or_else(|| segment.strip_suffix('h'))
            {
                Some(digits) => (digits, true),
                None => (segment, false),
            };
            let index: u32 = digits.parse().map_err(|_| {
                DerivationError::DerivationFailure(format!("bad path segment '{}'", segment))
            })?;
            if index >= HARDENED {
                return Err(DerivationError::DerivationFailure(format!(
                    "path index out of range: {}",
                    index
                )));
            }
            Ok(if hardened { index | HARDENED } else { index })
        })
        .collect()
}

/// BIP-32 secp256k1 private key at `path`.
pub fn derive_secp256k1(seed: &Seed, path: &str) -> Result<PrivateKey, DerivationError> {
    let indices = parse_path(path)?;

    let mut xpriv = XPriv::root_from_seed(seed.as_bytes(), None)
        .map_err(|e| DerivationError::DerivationFailure(format!("bip32 root: {}", e)))?;
    for index in indices {
        xpriv = xpriv
            .derive_child(index)
            .map_err(|e| DerivationError::DerivationFailure(format!("bip32 child: {}", e)))?;
    }

    let signing_key: &k256::ecdsa::SigningKey = xpriv.as_ref();
    let bytes: Zeroizing<[u8; 32]> = Zeroizing::new(signing_key.to_bytes().into());
    Ok(PrivateKey::new(*bytes))
}

/// SLIP-0010 Ed25519 private key at `path`. Every segment must be hardened.
pub fn derive_ed25519(seed: &Seed, path: &str) -> Result<PrivateKey, DerivationError> {
    let indices = parse_path(path)?;
    if let Some(index) = indices.iter().find(|i| **i < HARDENED) {
        return Err(DerivationError::DerivationFailure(format!(
            "ed25519 derivation requires hardened segments, got index {}",
            index
        )));
    }

    let (mut key, mut chain_code) = slip10_step(ED25519_SEED_KEY, &[&seed.as_bytes()[..]])?;
    for index in indices {
        let (child_key, child_chain) =
            slip10_step(&chain_code[..], &[&[0x00u8][..], &key[..], &index.to_be_bytes()[..]])?;
        key.zeroize();
        chain_code.zeroize();
        key = child_key;
        chain_code = child_chain;
    }
    chain_code.zeroize();

    Ok(PrivateKey::new(*key))
}

/// I = HMAC-SHA512(hmac_key, data...), split into (IL, IR).
fn slip10_step(
    hmac_key: &[u8],
    data: &[&[u8]],
) -> Result<(Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>), DerivationError> {
    let mut mac = HmacSha512::new_from_slice(hmac_key)
        .map_err(|e| DerivationError::DerivationFailure(format!("hmac init: {}", e)))?;
    for part in data {
        mac.update(part);
    }
    let mut output = Zeroizing::new([0u8; 64]);
    output.copy_from_slice(&mac.finalize().into_bytes());

    let mut key = Zeroizing::new([0u8; 32]);
    let mut chain_code = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&output[..32]);
    chain_code.copy_from_slice(&output[32..]);
    Ok((key, chain_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_parse_path() {
        assert_eq!(
            parse_path(paths::EVM).unwrap(),
            vec![44 | HARDENED, 60 | HARDENED, HARDENED, 0, 0]
        );
        assert_eq!(
            parse_path("m/44h/501h/0h/0h").unwrap(),
            vec![44 | HARDENED, 501 | HARDENED, HARDENED, HARDENED]
        );
        assert!(parse_path("44'/60'").is_err());
        assert!(parse_path("m/abc").is_err());
        assert!(parse_path("m/2147483648").is_err());
    }

    #[test]
    fn test_mnemonic_normalization() {
        let messy = format!("  {}  ", ABANDON.to_uppercase().replace(' ', "   "));
        assert!(parse_mnemonic(&messy).is_ok());
    }

    #[test]
    fn test_invalid_checksum_rejected() {
        let bad = ABANDON.replace("about", "abandon");
        assert!(matches!(parse_mnemonic(&bad), Err(DerivationError::InvalidMnemonic(_))));
    }

    #[test]
    fn test_unknown_word_rejected() {
        let bad = ABANDON.replace("about", "notaword");
        assert!(matches!(parse_mnemonic(&bad), Err(DerivationError::InvalidMnemonic(_))));
    }

    #[test]
    fn test_bip39_seed_vector() {
        // BIP-39 reference vector, passphrase "TREZOR"
        let seed = mnemonic_to_seed(ABANDON, "TREZOR").unwrap();
        assert_eq!(
            hex::encode(seed.as_bytes()),
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );
    }

    #[test]
    fn test_generate_mnemonic_word_counts() {
        for count in [12usize, 24] {
            let phrase = generate_mnemonic(count).unwrap();
            assert_eq!(phrase.split_whitespace().count(), count);
            assert!(parse_mnemonic(&phrase).is_ok());
        }
        assert!(generate_mnemonic(15).is_err());
    }

    #[test]
    fn test_ed25519_rejects_non_hardened() {
        let seed = mnemonic_to_seed(ABANDON, "").unwrap();
        assert!(derive_ed25519(&seed, "m/44'/501'/0'/0").is_err());
    }

    #[test]
    fn test_secp256k1_and_ed25519_keys_differ() {
        let seed = mnemonic_to_seed(ABANDON, "").unwrap();
        let evm = derive_secp256k1(&seed, paths::EVM).unwrap();
        let sol = derive_ed25519(&seed, paths::SOLANA).unwrap();
        assert_ne!(evm, sol);
    }

    #[test]
    fn test_slip10_master_vector() {
        // SLIP-0010 test vector 1 for ed25519, chain m/0'
        let vector_seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let (key, _) = slip10_step(ED25519_SEED_KEY, &[&vector_seed[..]]).unwrap();
        assert_eq!(
            hex::encode(&key[..]),
            "2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7"
        );
    }

    #[test]
    fn test_derive_requires_chains() {
        assert!(derive(ABANDON, "", &BTreeSet::new()).is_err());
    }
}
