//! BlobStore の実装
//!
//! - **MemoryBlobStore**: プロセス内（テスト・デモ用）。容量制限とオフライン切り替えで障害を注入できる
//! - **FileBlobStore**: `<dir>/<key>.json` に 1 ファイルで保存（CLI 用）

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::fs;

use crate::ports::{BlobError, BlobStore};

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
    /// Total bytes across all keys.
    quota: Option<usize>,
    offline: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would bring the total size above `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// While offline every read and write fails with `BlobError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Raw value, bypassing the offline switch.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn check_online(&self) -> Result<(), BlobError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(BlobError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read(&self, key: &str) -> Result<Option<String>, BlobError> {
        self.check_online()?;
        Ok(self.peek(key))
    }

    async fn write(&self, key: &str, value: String) -> Result<(), BlobError> {
        self.check_online()?;
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(quota) = self.quota {
            let others: usize = blobs
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > quota {
                return Err(BlobError::CapacityExceeded { needed, quota });
            }
        }
        blobs.insert(key.to_string(), value);
        Ok(())
    }
}

/// One JSON file per key under `dir`.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn read(&self, key: &str) -> Result<Option<String>, BlobError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: String) -> Result<(), BlobError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        // rename is atomic on the same filesystem; readers never see a half-written blob
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value.as_bytes()).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
