//! WorkflowState - タスクのライフサイクル状態
//!
//! # 状態遷移
//! - DRAFT -> SUBMITTED -> IN_REVIEW -> APPROVED -> COMPLETED
//! - IN_REVIEW -> REJECTED -> DRAFT (restart)
//!
//! 遷移の合法性は `workflow::table` が唯一の正本です。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    Draft,
    Submitted,
    InReview,
    Approved,
    Completed,
    Rejected,
}

impl WorkflowState {
    /// Every state, in lifecycle order.
    pub const ALL: [WorkflowState; 6] = [
        WorkflowState::Draft,
        WorkflowState::Submitted,
        WorkflowState::InReview,
        WorkflowState::Approved,
        WorkflowState::Completed,
        WorkflowState::Rejected,
    ];

    /// Wire name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowState::Draft => "DRAFT",
            WorkflowState::Submitted => "SUBMITTED",
            WorkflowState::InReview => "IN_REVIEW",
            WorkflowState::Approved => "APPROVED",
            WorkflowState::Completed => "COMPLETED",
            WorkflowState::Rejected => "REJECTED",
        }
    }

    /// No outgoing edges in the transition table.
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowState::Completed)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown workflow state: {0}")]
pub struct UnknownState(pub String);

/// Case-insensitive; accepts `in_review`, `IN-REVIEW` and `InReview` alike.
impl FromStr for WorkflowState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        WorkflowState::ALL
            .into_iter()
            .find(|state| state.as_str().replace('_', "") == normalized)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&WorkflowState::InReview).unwrap();
        assert_eq!(json, "\"IN_REVIEW\"");

        let back: WorkflowState = serde_json::from_str("\"REJECTED\"").unwrap();
        assert_eq!(back, WorkflowState::Rejected);
    }

    #[rstest]
    #[case("DRAFT", WorkflowState::Draft)]
    #[case("in_review", WorkflowState::InReview)]
    #[case("In-Review", WorkflowState::InReview)]
    #[case(" approved ", WorkflowState::Approved)]
    fn parses_loose_spellings(#[case] input: &str, #[case] expected: WorkflowState) {
        assert_eq!(input.parse::<WorkflowState>().unwrap(), expected);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "ARCHIVED".parse::<WorkflowState>().unwrap_err();
        assert_eq!(err, UnknownState("ARCHIVED".to_string()));
    }

    #[test]
    fn only_completed_is_terminal() {
        let terminal: Vec<_> = WorkflowState::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![WorkflowState::Completed]);
    }
}
