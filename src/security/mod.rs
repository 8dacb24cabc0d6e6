// src/security/mod.rs
//! Security-related functionality for the wallet
//!
//! The encrypted key vault and redaction helpers that keep secrets out of
//! logs.

pub mod redaction;
pub mod vault;

pub use redaction::{redact_bytes, redact_text, short_address};
pub use vault::{EncryptedVault, KdfParams, KeyVault, VAULT_VERSION};
