//! Board - 呼び出し側のフロー
//!
//! 画面相当のインメモリ view を持ち、すべての変更を `JobQueue` に流します。
//!
//! # 遷移 unit の流れ
//! 1. 実行開始時点の view からタスクを読む（enqueue 時ではない）
//! 2. `WorkflowEngine::attempt_transition`
//! 3. 成功したら `TaskStore::update_task` で永続化
//! 4. 永続化に成功してから view を更新
//!
//! 失敗時は view もストアも変更されないので、呼び出し側でのロールバックは不要です。
//! 結果は `Ticket` で受け取れます。キューにも同じ結果が返り、失敗はキュー側でもログされます。
//!
//! `refresh` も unit として流れるため、先に積まれた変更の保存を追い越しません。

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::oneshot;
use tracing::info;

use super::status::BoardStatus;
use crate::domain::{Error, JobId, Priority, Result, Task, TaskId, WorkflowState};
use crate::ports::{Clock, IdGenerator};
use crate::queue::JobQueue;
use crate::store::TaskStore;
use crate::workflow::WorkflowEngine;

type View = Arc<RwLock<Vec<Task>>>;

/// Handle to the outcome of one queued unit.
#[must_use = "a ticket does nothing unless its outcome is awaited"]
#[derive(Debug)]
pub struct Ticket<T = Task> {
    job: JobId,
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Ticket<T> {
    pub fn job_id(&self) -> JobId {
        self.job
    }

    /// Wait for the unit to run. `Error::Abandoned` if it never reported back.
    pub async fn outcome(self) -> Result<T> {
        self.rx.await.unwrap_or(Err(Error::Abandoned))
    }
}

#[derive(Clone)]
pub struct Board {
    engine: Arc<WorkflowEngine>,
    queue: JobQueue,
    store: Arc<TaskStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    view: View,
}

impl Board {
    pub fn new(
        engine: Arc<WorkflowEngine>,
        queue: JobQueue,
        store: Arc<TaskStore>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            engine,
            queue,
            store,
            ids,
            clock,
            view: View::default(),
        }
    }

    /// Replace the view with the persisted collection. Returns the task count.
    ///
    /// Runs as a queued unit, after everything submitted before it.
    pub async fn refresh(&self) -> Result<usize> {
        let store = Arc::clone(&self.store);
        let view = Arc::clone(&self.view);

        self.submit("Refresh board".to_string(), move || async move {
            let tasks = store.load().await?.tasks;
            let count = tasks.len();
            *view.write().unwrap_or_else(PoisonError::into_inner) = tasks;
            info!(tasks = count, "board refreshed");
            Ok(count)
        })
        .outcome()
        .await
    }

    /// Snapshot of the view, in persisted order.
    pub fn tasks(&self) -> Vec<Task> {
        self.view.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn task(&self, id: TaskId) -> Option<Task> {
        find_in(&self.view, id)
    }

    /// States the task may move to next. Empty for unknown ids.
    pub fn actions(&self, id: TaskId) -> &'static [WorkflowState] {
        self.task(id)
            .map(|task| self.engine.next_states(task.state))
            .unwrap_or(&[])
    }

    /// Queue creation of a new `DRAFT` task.
    ///
    /// The title is validated immediately; the task only appears in the view
    /// once it has been persisted.
    pub fn create_task(&self, title: &str, priority: Priority) -> Result<Ticket> {
        let task = Task::new(self.ids.generate_task_id(), title, priority, self.clock.now())?;
        let label = format!("Create {} \"{}\"", task.id, task.title);
        let store = Arc::clone(&self.store);
        let view = Arc::clone(&self.view);

        Ok(self.submit(label, move || async move {
            let saved = store.update_task(&task).await?;
            upsert_in(&view, saved.clone());
            Ok(saved)
        }))
    }

    /// Queue a transition of `id` to `target`.
    pub fn request_transition(&self, id: TaskId, target: WorkflowState) -> Ticket {
        let label = format!("Move {id} to {target}");
        let engine = Arc::clone(&self.engine);
        let store = Arc::clone(&self.store);
        let view = Arc::clone(&self.view);

        info!(task = %id, %target, "transition requested");
        self.submit(label, move || async move {
            let mut task = find_in(&view, id).ok_or(Error::NotFound(id))?;
            let moved = engine.attempt_transition(&mut task, target).await?.clone();
            store.update_task(&moved).await?;
            upsert_in(&view, moved.clone());
            Ok(moved)
        })
    }

    pub fn status(&self) -> BoardStatus {
        BoardStatus::new(self.queue.status(), self.engine.in_flight(), &self.tasks())
    }

    pub async fn wait_idle(&self) {
        self.queue.wait_idle().await;
    }

    /// Enqueue `unit`; its result goes to the ticket and to the queue.
    fn submit<T, F, Fut>(&self, label: String, unit: F) -> Ticket<T>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job = self.queue.submit(label, move || async move {
            let outcome = unit().await;
            // the submitter may have dropped its ticket
            let _ = tx.send(outcome.clone());
            outcome.map(|_| ())
        });
        Ticket { job, rx }
    }
}

fn find_in(view: &View, id: TaskId) -> Option<Task> {
    view.read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|t| t.id == id)
        .cloned()
}

fn upsert_in(view: &View, task: Task) {
    let mut tasks = view.write().unwrap_or_else(PoisonError::into_inner);
    match tasks.iter_mut().find(|t| t.id == task.id) {
        Some(slot) => *slot = task,
        None => tasks.push(task),
    }
}
