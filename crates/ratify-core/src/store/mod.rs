//! TaskStore - タスク集合の永続化
//!
//! すべてのタスクを 1 つの blob（JSON `{"tasks": [...]}`）として保存します。
//! 読み書きそれぞれに NetworkModel の delay 分のレイテンシが入ります（`fails` は無視）。
//!
//! # 注意
//! `update_task` は load → 置換/追加 → save の read-modify-write で、
//! ストア自体は同時呼び出しを直列化しません。並行に呼ぶと後勝ちで更新が失われます。
//! 呼び出し側（`app::Board`）はすべての更新を `JobQueue` 経由で流すことでこれを防ぎます。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{Result, StorageError, Task, TaskId};
use crate::ports::{BlobStore, NetworkModel};

/// Default blob key.
pub const DEFAULT_KEY: &str = "ratify.tasks";

/// Persisted blob shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCollection {
    pub tasks: Vec<Task>,
}

impl TaskCollection {
    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Replace the task with the same id in place, or append it.
    /// Returns `true` when an existing entry was replaced.
    pub fn upsert(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => {
                self.tasks.push(task);
                false
            }
        }
    }
}

pub struct TaskStore {
    blobs: Arc<dyn BlobStore>,
    key: String,
    latency: Arc<dyn NetworkModel>,
}

impl TaskStore {
    pub fn new(blobs: Arc<dyn BlobStore>, latency: Arc<dyn NetworkModel>) -> Self {
        Self {
            blobs,
            key: DEFAULT_KEY.to_string(),
            latency,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn simulate_latency(&self) {
        tokio::time::sleep(self.latency.trial().delay).await;
    }

    /// Read the whole collection. A key that was never written loads as empty.
    pub async fn load(&self) -> Result<TaskCollection> {
        self.simulate_latency().await;

        let raw = self.blobs.read(&self.key).await.map_err(|source| {
            warn!(key = %self.key, error = %source, "blob read failed");
            StorageError::Read {
                key: self.key.clone(),
                source: Arc::new(source),
            }
        })?;

        let Some(raw) = raw else {
            debug!(key = %self.key, "no blob yet; starting empty");
            return Ok(TaskCollection::default());
        };

        let collection: TaskCollection =
            serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                key: self.key.clone(),
                source: Arc::new(source),
            })?;
        debug!(key = %self.key, tasks = collection.tasks.len(), "collection loaded");
        Ok(collection)
    }

    /// Overwrite the whole collection.
    pub async fn save(&self, collection: &TaskCollection) -> Result<()> {
        self.simulate_latency().await;

        let raw = serde_json::to_string(collection)
            .map_err(|source| StorageError::Encode(Arc::new(source)))?;
        self.blobs
            .write(&self.key, raw)
            .await
            .map_err(|source| {
                warn!(key = %self.key, error = %source, "blob write failed");
                StorageError::Write {
                    key: self.key.clone(),
                    source: Arc::new(source),
                }
            })?;
        debug!(key = %self.key, tasks = collection.tasks.len(), "collection saved");
        Ok(())
    }

    /// Load, replace the entry with the same id (or append), save.
    ///
    /// Not atomic: concurrent calls may lose updates. Route writes through a
    /// single `JobQueue` to serialize them.
    pub async fn update_task(&self, task: &Task) -> Result<Task> {
        let mut collection = self.load().await?;
        let replaced = collection.upsert(task.clone());
        self.save(&collection).await?;
        debug!(task = %task.id, replaced, "task persisted");
        Ok(task.clone())
    }

    pub async fn find_task(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.load().await?.find(id).cloned())
    }
}
