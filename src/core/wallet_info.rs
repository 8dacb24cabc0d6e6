// src/core/wallet_info.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::core::chain::ChainId;

/// The only persisted form of a wallet: sealed key material plus public
/// metadata. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub wallet_id: Uuid,
    /// Vault blob, base64 in JSON.
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    pub public_addresses: BTreeMap<ChainId, String>,
    pub created_at: DateTime<Utc>,
}

impl WalletRecord {
    pub fn chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.public_addresses.keys().copied()
    }

    pub fn address(&self, chain: ChainId) -> Option<&str> {
        self.public_addresses.get(&chain).map(String::as_str)
    }
}

/// Result of `create_wallet`: the new id and its public addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedWallet {
    pub wallet_id: Uuid,
    pub addresses: BTreeMap<ChainId, String>,
}

/// Listing entry, no ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub wallet_id: Uuid,
    pub addresses: BTreeMap<ChainId, String>,
    pub created_at: DateTime<Utc>,
}

impl From<&WalletRecord> for WalletSummary {
    fn from(record: &WalletRecord) -> Self {
        Self {
            wallet_id: record.wallet_id,
            addresses: record.public_addresses.clone(),
            created_at: record.created_at,
        }
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> WalletRecord {
        let mut public_addresses = BTreeMap::new();
        public_addresses.insert(ChainId::Ethereum, "0xabc".to_string());
        public_addresses.insert(ChainId::Solana, "Sol111".to_string());
        WalletRecord {
            wallet_id: Uuid::new_v4(),
            ciphertext: vec![1, 2, 3, 250],
            public_addresses,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_json_shape() {
        let record = record();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["ciphertext"], "AQID+g==");
        assert_eq!(json["public_addresses"]["ethereum"], "0xabc");

        let back: WalletRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_bad_base64_rejected() {
        let mut json = serde_json::to_value(record()).unwrap();
        json["ciphertext"] = serde_json::json!("***");
        assert!(serde_json::from_value::<WalletRecord>(json).is_err());
    }

    #[test]
    fn test_summary_hides_ciphertext() {
        let record = record();
        let summary = WalletSummary::from(&record);
        assert_eq!(summary.addresses.len(), 2);
        assert!(serde_json::to_string(&summary).unwrap().find("ciphertext").is_none());
        assert_eq!(record.address(ChainId::Solana), Some("Sol111"));
        assert_eq!(record.chains().count(), 2);
    }
}
