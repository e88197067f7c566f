//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! engine / queue / store はそれぞれ明示的に生成し、`Arc` で Board に渡します。
//! `build()` は設定を検証し、不正なら起動前に `BuildError` を返します（Fail-fast）。
//!
//! 何も差し替えなければ:
//! - 遷移: `RandomNetwork(transition_latency, failure_rate)`
//! - 保存: `RandomNetwork::reliable(storage_latency)`
//! - blob: `data_dir` があれば `FileBlobStore`、なければ `MemoryBlobStore`

use std::sync::Arc;

use tracing::info;

use super::board::Board;
use crate::config::Config;
use crate::impls::{FileBlobStore, MemoryBlobStore, RandomNetwork};
use crate::ports::{BlobStore, Clock, IdGenerator, LatencyRange, NetworkModel, SystemClock, UlidGenerator};
use crate::queue::JobQueue;
use crate::store::TaskStore;
use crate::workflow::WorkflowEngine;

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("failure rate must be within [0, 1], got {0}")]
    FailureRate(f64),

    #[error("{which} latency range is inverted: {range}")]
    InvertedLatency {
        which: &'static str,
        range: LatencyRange,
    },

    #[error("storage key must not be empty")]
    EmptyStorageKey,
}

/// Wires the components of one board.
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(Config::from_env()?)
///     .network(Arc::new(ScriptedNetwork::new()))
///     .build()?;
/// app.board.refresh().await?;
/// ```
pub struct AppBuilder {
    config: Config,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    network: Option<Arc<dyn NetworkModel>>,
    storage_latency: Option<Arc<dyn NetworkModel>>,
    blobs: Option<Arc<dyn BlobStore>>,
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clock: None,
            ids: None,
            network: None,
            storage_latency: None,
            blobs: None,
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Replace the transition latency/fault model.
    pub fn network(mut self, network: Arc<dyn NetworkModel>) -> Self {
        self.network = Some(network);
        self
    }

    /// Replace the storage latency model.
    pub fn storage_latency(mut self, latency: Arc<dyn NetworkModel>) -> Self {
        self.storage_latency = Some(latency);
        self
    }

    pub fn blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    fn validate(&self) -> Result<(), BuildError> {
        let config = &self.config;
        if !(0.0..=1.0).contains(&config.failure_rate) {
            return Err(BuildError::FailureRate(config.failure_rate));
        }
        for (which, range) in [
            ("transition", config.transition_latency),
            ("storage", config.storage_latency),
        ] {
            if !range.is_valid() {
                return Err(BuildError::InvertedLatency { which, range });
            }
        }
        if config.storage_key.trim().is_empty() {
            return Err(BuildError::EmptyStorageKey);
        }
        Ok(())
    }

    pub fn build(self) -> Result<App, BuildError> {
        self.validate()?;
        let config = self.config;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));
        let network = self.network.unwrap_or_else(|| {
            Arc::new(RandomNetwork::new(config.transition_latency, config.failure_rate))
        });
        let storage_latency = self
            .storage_latency
            .unwrap_or_else(|| Arc::new(RandomNetwork::reliable(config.storage_latency)));
        let blobs: Arc<dyn BlobStore> = match (self.blobs, &config.data_dir) {
            (Some(blobs), _) => blobs,
            (None, Some(dir)) => Arc::new(FileBlobStore::new(dir)),
            (None, None) => Arc::new(MemoryBlobStore::new()),
        };

        let engine = Arc::new(
            WorkflowEngine::new(network, Arc::clone(&clock)).with_guard(config.guard),
        );
        let queue = JobQueue::new();
        let store = Arc::new(
            TaskStore::new(blobs, storage_latency).with_key(config.storage_key.clone()),
        );
        let board = Board::new(
            Arc::clone(&engine),
            queue.clone(),
            Arc::clone(&store),
            ids,
            clock,
        );

        info!(
            guard = ?config.guard,
            failure_rate = config.failure_rate,
            transition_latency = %config.transition_latency,
            storage_key = %config.storage_key,
            "app built"
        );

        Ok(App {
            config,
            engine,
            queue,
            store,
            board,
        })
    }
}

/// The wired components. `board` is the entry point for callers; the others
/// are exposed for inspection and tests.
pub struct App {
    pub config: Config,
    pub engine: Arc<WorkflowEngine>,
    pub queue: JobQueue,
    pub store: Arc<TaskStore>,
    pub board: Board,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::ScriptedNetwork;
    use crate::workflow::TransitionGuard;
    use rstest::rstest;

    #[rstest]
    #[case::rate_above_one(Config { failure_rate: 1.5, ..Config::default() })]
    #[case::negative_rate(Config { failure_rate: -0.1, ..Config::default() })]
    #[case::nan_rate(Config { failure_rate: f64::NAN, ..Config::default() })]
    #[case::inverted_transition(Config { transition_latency: LatencyRange::new(10, 5), ..Config::default() })]
    #[case::inverted_storage(Config { storage_latency: LatencyRange::new(300, 100), ..Config::default() })]
    #[case::empty_key(Config { storage_key: " ".to_string(), ..Config::default() })]
    fn invalid_config_fails_fast(#[case] config: Config) {
        assert!(AppBuilder::new(config).build().is_err());
    }

    #[test]
    fn inverted_range_names_the_offending_setting() {
        let config = Config {
            storage_latency: LatencyRange::new(300, 100),
            ..Config::default()
        };
        let err = AppBuilder::new(config).build().err().unwrap();
        assert_eq!(
            err,
            BuildError::InvertedLatency {
                which: "storage",
                range: LatencyRange::new(300, 100)
            }
        );
    }

    #[test]
    fn default_config_builds() {
        let app = AppBuilder::new(Config::default()).build().unwrap();
        assert_eq!(app.store.key(), "ratify.tasks");
        assert_eq!(app.engine.guard(), TransitionGuard::Lenient);
        assert!(app.queue.status().is_idle());
    }

    #[test]
    fn strict_guard_and_key_come_from_config() {
        let config = Config {
            guard: TransitionGuard::Strict,
            storage_key: "custom".to_string(),
            ..Config::default()
        };
        let app = AppBuilder::new(config)
            .network(Arc::new(ScriptedNetwork::new()))
            .build()
            .unwrap();
        assert_eq!(app.engine.guard(), TransitionGuard::Strict);
        assert_eq!(app.store.key(), "custom");
    }
}
