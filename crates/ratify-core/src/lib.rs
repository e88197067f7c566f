//! ratify-core
//!
//! Core building blocks for the Ratify task-approval workflow.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, state, task, errors）
//! - **ports**: 抽象化レイヤー（Clock, IdGenerator, NetworkModel, BlobStore）
//! - **impls**: ports の実装（RandomNetwork, ScriptedNetwork, MemoryBlobStore, FileBlobStore）
//! - **workflow**: 遷移表・タスク単位のロック・WorkflowEngine
//! - **queue**: 逐次実行の FIFO ジョブキュー
//! - **store**: タスク集合の read-modify-write 永続化
//! - **app**: AppBuilder と Board（呼び出し側のフロー）
//! - **config**: 環境変数からの設定
//! - **observability**: キューの進捗テレメトリ
//!
//! # 直列化の二重構造
//! 同じタスクへの同時遷移は `workflow::LockSet` が拒否し、
//! ストアへの書き込みの競合は `queue::JobQueue` がすべての unit を 1 つずつ流すことで防ぎます。
//! どちらか片方だけでは足りません。

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod queue;
pub mod store;
pub mod workflow;

pub use app::{App, AppBuilder, Board, Ticket};
pub use config::Config;
pub use domain::{Error, Priority, Result, Task, TaskId, WorkflowState};
