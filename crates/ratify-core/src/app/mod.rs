//! App - アプリケーション層
//!
//! engine / queue / store を組み合わせて呼び出し側のフローを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: 構築とワイヤリング（起動時検証）
//! - **Board**: インメモリ view と、キュー経由の作成・遷移
//! - **BoardStatus**: 進捗表示用スナップショット

pub mod board;
pub mod builder;
pub mod status;

// 主要な型を再エクスポート
pub use self::board::{Board, Ticket};
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::status::{BoardStatus, QueueStatus};
