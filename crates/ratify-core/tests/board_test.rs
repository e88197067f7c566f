//! End-to-end caller flow: board -> queue -> engine -> store.

use std::sync::Arc;
use std::time::Duration;

use ratify_core::domain::{Error, ErrorKind, WorkflowError};
use ratify_core::impls::{MemoryBlobStore, ScriptedNetwork};
use ratify_core::ports::Trial;
use ratify_core::{App, AppBuilder, Config, Priority, WorkflowState};

fn app(blobs: Arc<MemoryBlobStore>, network: Arc<ScriptedNetwork>) -> App {
    AppBuilder::new(Config::default())
        .network(network)
        .storage_latency(Arc::new(ScriptedNetwork::with_fallback(Trial::success(
            Duration::from_millis(200),
        ))))
        .blob_store(blobs)
        .build()
        .unwrap()
}

fn slow_network() -> Arc<ScriptedNetwork> {
    Arc::new(ScriptedNetwork::with_fallback(Trial::success(Duration::from_millis(1500))))
}

#[tokio::test(start_paused = true)]
async fn back_to_back_transitions_on_one_task_both_succeed() {
    let app = app(Arc::new(MemoryBlobStore::new()), slow_network());
    let board = &app.board;
    let task = board.create_task("Contract", Priority::High).unwrap().outcome().await.unwrap();

    // neither ticket is awaited before the second request
    let first = board.request_transition(task.id, WorkflowState::Submitted);
    let second = board.request_transition(task.id, WorkflowState::InReview);

    assert_eq!(first.outcome().await.unwrap().state(), WorkflowState::Submitted);
    let last = second.outcome().await.unwrap();

    assert_eq!(last.state(), WorkflowState::InReview);
    let actions: Vec<_> = last.history().iter().map(|h| h.action.as_str()).collect();
    assert_eq!(actions, ["MOVED_TO_SUBMITTED", "MOVED_TO_IN_REVIEW"]);
    assert_eq!(app.engine.in_flight(), 0);
    assert_eq!(app.queue.status().failed, 0);
}

#[tokio::test(start_paused = true)]
async fn mutations_survive_a_reopened_board() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let first = app(blobs.clone(), slow_network());

    let task = first
        .board
        .create_task("Onboarding checklist", Priority::Medium)
        .unwrap()
        .outcome()
        .await
        .unwrap();
    first
        .board
        .request_transition(task.id, WorkflowState::Submitted)
        .outcome()
        .await
        .unwrap();

    let reopened = app(blobs, slow_network());
    assert!(reopened.board.tasks().is_empty());
    assert_eq!(reopened.board.refresh().await.unwrap(), 1);

    let loaded = reopened.board.task(task.id).unwrap();
    assert_eq!(loaded.title, "Onboarding checklist");
    assert_eq!(loaded.state(), WorkflowState::Submitted);
    assert_eq!(loaded.history().len(), 1);
    assert_eq!(reopened.board.actions(task.id), &[WorkflowState::InReview]);
}

#[tokio::test(start_paused = true)]
async fn transient_failure_leaves_store_untouched_and_retry_succeeds() {
    let network = slow_network();
    let app = app(Arc::new(MemoryBlobStore::new()), network.clone());
    let task = app.board.create_task("Invoice", Priority::Low).unwrap().outcome().await.unwrap();

    network.push(Trial::failure(Duration::from_millis(800)));
    let err = app
        .board
        .request_transition(task.id, WorkflowState::Submitted)
        .outcome()
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(
        err,
        Error::Workflow(WorkflowError::TransitionFailed { target: WorkflowState::Submitted, .. })
    ));

    let stored = app.store.find_task(task.id).await.unwrap().unwrap();
    assert_eq!(stored, task);
    assert!(!app.engine.is_locked(task.id));

    let moved = app
        .board
        .request_transition(task.id, WorkflowState::Submitted)
        .outcome()
        .await
        .unwrap();
    assert_eq!(moved.history().len(), 1);
    assert_eq!(app.store.find_task(task.id).await.unwrap(), Some(moved));
}

#[tokio::test(start_paused = true)]
async fn queued_updates_of_different_tasks_are_all_persisted() {
    let app = app(Arc::new(MemoryBlobStore::new()), slow_network());
    let board = &app.board;

    let created = [
        board.create_task("a", Priority::Low).unwrap(),
        board.create_task("b", Priority::Medium).unwrap(),
        board.create_task("c", Priority::High).unwrap(),
    ];
    let mut ids = Vec::new();
    for ticket in created {
        ids.push(ticket.outcome().await.unwrap().id);
    }

    let tickets: Vec<_> = ids
        .iter()
        .map(|&id| board.request_transition(id, WorkflowState::Submitted))
        .collect();
    assert_eq!(app.queue.status().pending, tickets.len());
    for ticket in tickets {
        ticket.outcome().await.unwrap();
    }

    let stored = app.store.load().await.unwrap().tasks;
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|t| t.state() == WorkflowState::Submitted));
    // creation order is the persisted order
    assert_eq!(stored.iter().map(|t| t.id).collect::<Vec<_>>(), ids);
}

#[tokio::test(start_paused = true)]
async fn completed_task_offers_no_actions() {
    let app = app(Arc::new(MemoryBlobStore::new()), slow_network());
    let board = &app.board;
    let task = board.create_task("Release", Priority::High).unwrap().outcome().await.unwrap();

    for target in [
        WorkflowState::Submitted,
        WorkflowState::InReview,
        WorkflowState::Approved,
        WorkflowState::Completed,
    ] {
        assert!(board.actions(task.id).contains(&target));
        board.request_transition(task.id, target).outcome().await.unwrap();
    }

    assert!(board.actions(task.id).is_empty());
    assert_eq!(board.task(task.id).unwrap().history().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn storage_outage_is_reported_and_not_retried() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let app = app(blobs.clone(), slow_network());
    let task = app.board.create_task("Audit", Priority::Low).unwrap().outcome().await.unwrap();

    blobs.set_offline(true);
    let err = app
        .board
        .request_transition(task.id, WorkflowState::Submitted)
        .outcome()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Infrastructure);

    // the view only changes after a successful save
    assert_eq!(app.board.task(task.id).unwrap().state(), WorkflowState::Draft);
    blobs.set_offline(false);
    assert_eq!(app.store.find_task(task.id).await.unwrap(), Some(task));
}

#[tokio::test]
async fn file_backed_board_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: Some(dir.path().to_path_buf()),
        ..Config::default().instant()
    };

    let first = AppBuilder::new(config.clone()).build().unwrap();
    let task = first
        .board
        .create_task("Persist me", Priority::Medium)
        .unwrap()
        .outcome()
        .await
        .unwrap();
    assert!(dir.path().join("ratify.tasks.json").exists());

    let second = AppBuilder::new(config).build().unwrap();
    second.board.refresh().await.unwrap();
    assert_eq!(second.board.task(task.id), Some(task));
}

#[tokio::test]
async fn system_clock_tasks_reload_unchanged() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let build = |blobs: Arc<MemoryBlobStore>| {
        AppBuilder::new(Config::default().instant())
            .blob_store(blobs)
            .build()
            .unwrap()
    };

    let first = build(blobs.clone());
    let task = first.board.create_task("Now", Priority::High).unwrap().outcome().await.unwrap();
    let moved = first
        .board
        .request_transition(task.id, WorkflowState::Submitted)
        .outcome()
        .await
        .unwrap();
    assert_eq!(first.store.find_task(task.id).await.unwrap(), Some(moved.clone()));

    let second = build(blobs);
    assert_eq!(second.board.refresh().await.unwrap(), 1);
    let loaded = second.board.task(task.id).unwrap();
    assert_eq!(loaded, moved);
    assert_eq!(loaded.created_at, task.created_at);
}
