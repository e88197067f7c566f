//! Ports - 抽象化レイヤー
//!
//! コアが外部（時刻・ID・ネットワーク・保存先）に触れる箇所はすべて trait にして注入します。
//! 実装は `impls` にあります。

pub mod blob_store;
pub mod clock;
pub mod id_generator;
pub mod network;

// 主要な trait を再エクスポート
pub use self::blob_store::{BlobError, BlobStore};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::network::{InvalidLatencyRange, LatencyRange, NetworkModel, Trial};
