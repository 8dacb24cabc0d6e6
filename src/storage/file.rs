use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::WalletStore;
use crate::core::errors::WalletError;
use crate::core::wallet_info::WalletRecord;

/// One pretty-printed JSON file per wallet: `<dir>/<wallet_id>.json`.
#[derive(Debug, Clone)]
pub struct FileWalletStore {
    dir: PathBuf,
}

impl FileWalletStore {
    /// Opens (and creates if missing) the wallet directory.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, WalletError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            WalletError::Storage(format!("failed to create {}: {}", dir.display(), e))
        })?;
        info!(dir = %dir.display(), "Opened wallet directory");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, wallet_id: &Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", wallet_id))
    }
}

fn parse_record(path: &Path, raw: &[u8]) -> Result<WalletRecord, WalletError> {
    serde_json::from_slice(raw).map_err(|e| {
        WalletError::CorruptRecord(format!("{} is not a wallet record: {}", path.display(), e))
    })
}

/// Writes `bytes` to `tmp`, fsyncs, then links it in as `path`.
/// The link fails with `AlreadyExists` if `path` is taken, so `path` only
/// ever appears fully written.
async fn write_and_link(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    // 目标已存在时链接失败
    tokio::fs::hard_link(tmp, path).await
}

#[async_trait]
impl WalletStore for FileWalletStore {
    async fn get(&self, wallet_id: &Uuid) -> Result<Option<WalletRecord>, WalletError> {
        let path = self.path_for(wallet_id);
        match tokio::fs::read(&path).await {
            Ok(raw) => parse_record(&path, &raw).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_new(&self, record: WalletRecord) -> Result<(), WalletError> {
        let path = self.path_for(&record.wallet_id);
        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| WalletError::Storage(format!("serialize record: {}", e)))?;

        let tmp = self.dir.join(format!("{}.{}.tmp", record.wallet_id, Uuid::new_v4().simple()));
        let linked = write_and_link(&tmp, &path, &json).await;
        if let Err(e) = tokio::fs::remove_file(&tmp).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %tmp.display(), error = %e, "Failed to remove temp file");
            }
        }
        match linked {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(WalletError::DuplicateWallet(record.wallet_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        }

        debug!(wallet_id = %record.wallet_id, path = %path.display(), "Stored wallet record");
        Ok(())
    }

    async fn remove(&self, wallet_id: &Uuid) -> Result<bool, WalletError> {
        match tokio::fs::remove_file(self.path_for(wallet_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Records sorted by creation time. Unreadable files are skipped with a warning.
    async fn list(&self) -> Result<Vec<WalletRecord>, WalletError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = match tokio::fs::read(&path).await {
                Ok(raw) => parse_record(&path, &raw),
                Err(e) => Err(e.into()),
            };
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable wallet file"),
            }
        }

        records.sort_by(|a, b| {
            a.created_at.cmp(&b.created_at).then_with(|| a.wallet_id.cmp(&b.wallet_id))
        });
        Ok(records)
    }
}
