//! Workflow - 遷移表・タスク単位のロック・遷移エンジン

pub mod engine;
pub mod lock;
pub mod table;

pub use self::engine::{TransitionGuard, WorkflowEngine};
pub use self::lock::{LockGuard, LockSet};
pub use self::table::{can_transition, next_states, next_states_by_name};
