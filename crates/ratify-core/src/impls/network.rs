//! NetworkModel の実装
//!
//! - **RandomNetwork**: 一様分布のレイテンシ + Bernoulli 障害（本番のシミュレーション）
//! - **ScriptedNetwork**: 事前に決めた Trial を順番に返す（テスト用。`--instant` は幅 0 の RandomNetwork）

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rand::Rng;

use crate::ports::{LatencyRange, NetworkModel, Trial};

/// Uniform latency over `latency`, failing with probability `failure_rate`.
#[derive(Debug, Clone)]
pub struct RandomNetwork {
    latency: LatencyRange,
    failure_rate: f64,
}

impl RandomNetwork {
    /// `failure_rate` is clamped into `[0, 1]`; NaN counts as 0.
    pub fn new(latency: LatencyRange, failure_rate: f64) -> Self {
        let failure_rate = if failure_rate.is_nan() {
            0.0
        } else {
            failure_rate.clamp(0.0, 1.0)
        };
        let latency = if latency.is_valid() {
            latency
        } else {
            LatencyRange::new(latency.max_ms, latency.min_ms)
        };
        Self {
            latency,
            failure_rate,
        }
    }

    /// Latency only; every call succeeds.
    pub fn reliable(latency: LatencyRange) -> Self {
        Self::new(latency, 0.0)
    }

    pub fn latency(&self) -> LatencyRange {
        self.latency
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }
}

impl NetworkModel for RandomNetwork {
    fn trial(&self) -> Trial {
        let mut rng = rand::thread_rng();
        let ms = rng.gen_range(self.latency.min_ms..=self.latency.max_ms);
        Trial {
            delay: Duration::from_millis(ms),
            fails: rng.gen_bool(self.failure_rate),
        }
    }
}

/// Replays queued trials in order, then the fallback forever.
#[derive(Debug)]
pub struct ScriptedNetwork {
    script: Mutex<VecDeque<Trial>>,
    fallback: Trial,
    drawn: AtomicUsize,
}

impl ScriptedNetwork {
    /// Instant success once the script is exhausted.
    pub fn new() -> Self {
        Self::with_fallback(Trial::success(Duration::ZERO))
    }

    pub fn with_fallback(fallback: Trial) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            drawn: AtomicUsize::new(0),
        }
    }

    /// Builder-style `push`.
    pub fn then(self, trial: Trial) -> Self {
        self.push(trial);
        self
    }

    pub fn push(&self, trial: Trial) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(trial);
    }

    /// Number of trials handed out so far.
    pub fn drawn(&self) -> usize {
        self.drawn.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkModel for ScriptedNetwork {
    fn trial(&self) -> Trial {
        self.drawn.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.fallback)
    }
}
