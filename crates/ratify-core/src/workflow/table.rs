//! The static transition table.
//!
//! This is the single source of truth for legality; callers build their
//! affordances from `next_states` instead of encoding edges themselves.

use crate::domain::WorkflowState;

type S = WorkflowState;

/// States directly reachable from `state`.
pub fn next_states(state: WorkflowState) -> &'static [WorkflowState] {
    match state {
        S::Draft => &[S::Submitted],
        S::Submitted => &[S::InReview],
        S::InReview => &[S::Approved, S::Rejected],
        S::Approved => &[S::Completed],
        S::Completed => &[],
        S::Rejected => &[S::Draft],
    }
}

pub fn can_transition(from: WorkflowState, to: WorkflowState) -> bool {
    next_states(from).contains(&to)
}

/// Lookup by wire name; unknown names have no next states.
pub fn next_states_by_name(name: &str) -> &'static [WorkflowState] {
    name.parse().map(next_states).unwrap_or(&[])
}
