use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-only queue telemetry for progress display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    /// Units waiting behind the current one.
    pub pending: usize,
    /// Label of the unit being executed.
    pub current: Option<String>,
    pub completed: u64,
    pub failed: u64,
}

impl QueueStatus {
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.pending == 0
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.current {
            Some(label) => write!(f, "running: {label} ({} pending)", self.pending),
            None if self.pending > 0 => write!(f, "starting ({} pending)", self.pending),
            None => f.write_str("idle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_reads_idle_or_current_label() {
        assert_eq!(QueueStatus::default().to_string(), "idle");

        let busy = QueueStatus {
            pending: 2,
            current: Some("Move task-1 to SUBMITTED".to_string()),
            ..QueueStatus::default()
        };
        assert!(!busy.is_idle());
        assert_eq!(busy.to_string(), "running: Move task-1 to SUBMITTED (2 pending)");
    }
}
