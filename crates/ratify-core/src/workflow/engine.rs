//! WorkflowEngine - 遷移の実行
//!
//! # フロー（attempt_transition）
//! 1. lock を取得（`LockSet::try_acquire` は確認と挿入を一度に行う）。
//!    既に task.id があれば即座に `Locked`（レイテンシなし・表チェックなし）
//! 2. （Strict のみ）表で合法性チェック → `IllegalTransition`（guard はその場で解放）
//! 3. NetworkModel の delay だけ待つ（他タスクや呼び出し側はブロックしない）
//! 4. 失敗: task は一切変更せず `TransitionFailed`
//!    成功: state を更新し、履歴に `MOVED_TO_<target>` を 1 件追加
//! 5. どの経路でも guard の drop で lock を解放

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::lock::LockSet;
use super::table;
use crate::domain::{Task, TaskId, WorkflowError, WorkflowState};
use crate::ports::{Clock, NetworkModel};

/// Whether `attempt_transition` consults the transition table.
///
/// `Lenient` attempts any target and relies on callers only offering
/// `next_states`; `Strict` rejects targets the table does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionGuard {
    #[default]
    Lenient,
    Strict,
}

pub struct WorkflowEngine {
    locks: LockSet,
    network: Arc<dyn NetworkModel>,
    clock: Arc<dyn Clock>,
    guard: TransitionGuard,
}

impl WorkflowEngine {
    pub fn new(network: Arc<dyn NetworkModel>, clock: Arc<dyn Clock>) -> Self {
        Self {
            locks: LockSet::new(),
            network,
            clock,
            guard: TransitionGuard::default(),
        }
    }

    pub fn with_guard(mut self, guard: TransitionGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn guard(&self) -> TransitionGuard {
        self.guard
    }

    pub fn next_states(&self, state: WorkflowState) -> &'static [WorkflowState] {
        table::next_states(state)
    }

    pub fn can_transition(&self, from: WorkflowState, to: WorkflowState) -> bool {
        table::can_transition(from, to)
    }

    /// Is an attempt on `id` currently in flight?
    pub fn is_locked(&self, id: TaskId) -> bool {
        self.locks.contains(id)
    }

    /// Number of attempts currently in flight.
    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }

    /// Attempt to move `task` to `target`.
    ///
    /// On success the task is mutated in place and returned. On any error the
    /// task is left exactly as it was passed in.
    pub async fn attempt_transition<'t>(
        &self,
        task: &'t mut Task,
        target: WorkflowState,
    ) -> Result<&'t Task, WorkflowError> {
        let Some(_guard) = self.locks.try_acquire(task.id) else {
            warn!(task = %task.id, %target, "transition rejected: task is locked");
            return Err(WorkflowError::Locked(task.id));
        };

        if self.guard == TransitionGuard::Strict && !table::can_transition(task.state, target) {
            return Err(WorkflowError::IllegalTransition {
                task: task.id,
                from: task.state,
                to: target,
            });
        }

        let trial = self.network.trial();
        debug!(task = %task.id, from = %task.state, %target, delay_ms = trial.delay.as_millis() as u64, "transition started");
        tokio::time::sleep(trial.delay).await;

        if trial.fails {
            warn!(task = %task.id, %target, "transition failed");
            return Err(WorkflowError::TransitionFailed {
                task: task.id,
                target,
            });
        }

        let from = task.state;
        task.apply_transition(target, self.clock.now());
        info!(task = %task.id, %from, to = %target, "transition applied");
        Ok(task)
    }
}
