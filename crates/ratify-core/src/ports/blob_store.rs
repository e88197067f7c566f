//! BlobStore port - 単一 blob の永続化先
//!
//! ブラウザの localStorage 相当。key ごとに 1 つの文字列を保持します。
//! 読み書きの合成（read-modify-write）は `store::TaskStore` の責務で、
//! BlobStore 自体はトランザクションを提供しません。

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The medium rejected the write (quota).
    #[error("capacity exceeded: {needed} bytes needed, quota is {quota}")]
    CapacityExceeded { needed: usize, quota: usize },

    #[error("blob store unavailable")]
    Unavailable,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// `Ok(None)` when nothing has ever been written under `key`.
    async fn read(&self, key: &str) -> Result<Option<String>, BlobError>;

    /// Replace the whole value under `key`.
    async fn write(&self, key: &str, value: String) -> Result<(), BlobError>;
}
