//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **RandomNetwork / ScriptedNetwork**: NetworkModel
//! - **MemoryBlobStore / FileBlobStore**: BlobStore

pub mod blob;
pub mod network;

// 主要な型を再エクスポート
pub use self::blob::{FileBlobStore, MemoryBlobStore};
pub use self::network::{RandomNetwork, ScriptedNetwork};
