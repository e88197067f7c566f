//! NetworkModel port - リモート呼び出しのレイテンシと障害のシミュレーション
//!
//! エンジンは `Trial` の delay と outcome の両方を使い、ストアは delay のみを使います。
//! テストでは `ScriptedNetwork` を注入して成功/失敗を強制します。

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Result drawn for one simulated remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trial {
    pub delay: Duration,
    pub fails: bool,
}

impl Trial {
    pub fn success(delay: Duration) -> Self {
        Self {
            delay,
            fails: false,
        }
    }

    pub fn failure(delay: Duration) -> Self {
        Self { delay, fails: true }
    }
}

pub trait NetworkModel: Send + Sync {
    /// Draw the latency and outcome of the next call.
    fn trial(&self) -> Trial;
}

/// Inclusive latency range in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl LatencyRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const ZERO: LatencyRange = LatencyRange::new(0, 0);

    pub fn is_valid(&self) -> bool {
        self.min_ms <= self.max_ms
    }
}

impl fmt::Display for LatencyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}ms", self.min_ms, self.max_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid latency range `{0}` (expected `MIN..MAX` or a single value, in ms)")]
pub struct InvalidLatencyRange(pub String);

/// Parses `500..3000`, `500-3000` or a single fixed value `250`.
impl FromStr for LatencyRange {
    type Err = InvalidLatencyRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidLatencyRange(s.to_string());
        let trimmed = s.trim().trim_end_matches("ms");
        let (min, max) = match trimmed.split_once("..").or_else(|| trimmed.split_once('-')) {
            Some((min, max)) => (min, max),
            None => (trimmed, trimmed),
        };
        let min = min.trim().parse().map_err(|_| invalid())?;
        let max = max.trim().parse().map_err(|_| invalid())?;
        let range = LatencyRange::new(min, max);
        if range.is_valid() { Ok(range) } else { Err(invalid()) }
    }
}
