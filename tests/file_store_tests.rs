mod common;

use common::*;
use std::collections::HashMap;

use web3_wallet_core::core::config::NetworkConfig;
use web3_wallet_core::{ChainId, WalletConfig, WalletError, WalletManager};

fn config(dir: &std::path::Path) -> WalletConfig {
    let mut config = WalletConfig::default();
    config.networks = HashMap::from([(
        "solana".to_string(),
        NetworkConfig { rpc_url: "http://127.0.0.1:8899".into() },
    )]);
    let params = fast_params();
    config.security.argon2_memory_kib = params.m_cost;
    config.security.argon2_iterations = params.t_cost;
    config.security.argon2_parallelism = params.p_cost;
    config.storage.wallet_dir = dir.to_path_buf();
    config
}

#[tokio::test]
async fn test_wallet_survives_manager_restart() {
    let dir = tempfile::tempdir().unwrap();
    let wallet_id = {
        let manager = WalletManager::with_file_store(&config(dir.path())).await.unwrap();
        manager.create_wallet(ABANDON, None, PASSWORD).await.unwrap().wallet_id
    };

    let on_disk = dir.path().join(format!("{}.json", wallet_id));
    let raw = std::fs::read_to_string(&on_disk).unwrap();
    assert!(raw.contains(ABANDON_SOL));
    assert!(!raw.contains("abandon"));

    let manager = WalletManager::with_file_store(&config(dir.path())).await.unwrap();
    let addresses = manager.wallet_addresses(&wallet_id).await.unwrap();
    assert_eq!(addresses[&ChainId::Ethereum], ABANDON_EVM);
    manager.verify_password(&wallet_id, PASSWORD).await.unwrap();

    manager.delete_wallet(&wallet_id).await.unwrap();
    assert!(!on_disk.exists());
}

#[tokio::test]
async fn test_corrupt_file_reports_corrupt_record() {
    let dir = tempfile::tempdir().unwrap();
    let manager = WalletManager::with_file_store(&config(dir.path())).await.unwrap();
    let wallet_id = manager.create_wallet(ABANDON, None, PASSWORD).await.unwrap().wallet_id;

    std::fs::write(dir.path().join(format!("{}.json", wallet_id)), b"{ not json").unwrap();
    assert!(matches!(
        manager.wallet_addresses(&wallet_id).await,
        Err(WalletError::CorruptRecord(_))
    ));
}

#[tokio::test]
async fn test_rejects_unusable_kdf_settings() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.security.argon2_iterations = 0;
    assert!(matches!(
        WalletManager::with_file_store(&config).await,
        Err(WalletError::Config(_))
    ));
}
