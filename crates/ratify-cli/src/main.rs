//! ratify CLI - タスク承認ワークフローの操作
//!
//! すべての変更は Board 経由でキューに流れます。`--instant` でレイテンシと障害を無効化できます。

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ratify_core::{App, AppBuilder, Board, Config, Priority, Task, TaskId, WorkflowState};
use ratify_core::workflow::TransitionGuard;

const DEFAULT_DATA_DIR: &str = ".ratify";

#[derive(Parser)]
#[command(name = "ratify")]
#[command(about = "Task approval workflow with simulated latency", long_about = None)]
struct Cli {
    /// Directory holding the task collection (default: $RATIFY_DATA_DIR or .ratify)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Probability that a transition attempt fails
    #[arg(long, global = true)]
    failure_rate: Option<f64>,

    /// No simulated latency, no simulated faults
    #[arg(long, global = true)]
    instant: bool,

    /// Reject transitions the workflow table does not allow
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks
    List {
        /// Print the collection as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a task in DRAFT
    Create {
        title: String,
        #[arg(long, default_value = "MEDIUM")]
        priority: Priority,
    },
    /// Show a task and the states it may move to
    Next { id: TaskId },
    /// Move a task to another state
    Move {
        id: TaskId,
        target: WorkflowState,
        /// Re-enqueue this many times on a transient failure
        #[arg(long, default_value = "0")]
        retries: u32,
    },
    /// Create a few tasks and walk them through the workflow
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = config_from(&cli)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app = AppBuilder::new(config).build()?;
    app.board
        .refresh()
        .await
        .with_context(|| format!("failed to load `{}`", app.store.key()))?;

    match cli.command {
        Commands::List { json: true } => {
            println!("{}", serde_json::to_string_pretty(&app.board.tasks())?);
        }
        Commands::List { json: false } => list(&app.board),
        Commands::Create { title, priority } => {
            let task = app.board.create_task(&title, priority)?.outcome().await?;
            println!("Created {} - {}", task.id, task.title);
        }
        Commands::Next { id } => {
            let task = app.board.task(id).with_context(|| format!("task not found: {id}"))?;
            print_task(&task);
            let actions = app.board.actions(id);
            if actions.is_empty() {
                println!("  No further actions");
            } else {
                let names: Vec<_> = actions.iter().map(|s| s.as_str()).collect();
                println!("  Next: {}", names.join(", "));
            }
        }
        Commands::Move {
            id,
            target,
            retries,
        } => {
            if app.board.task(id).is_none() {
                bail!("task not found: {id}");
            }
            let task = move_with_retries(&app.board, id, target, retries).await?;
            println!("Moved {} to {}", task.id, task.state());
        }
        Commands::Demo => demo(&app).await?,
    }

    Ok(())
}

fn config_from(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;
    if cli.instant {
        config = config.instant();
    }
    if let Some(rate) = cli.failure_rate {
        config.failure_rate = rate;
    }
    if cli.strict {
        config.guard = TransitionGuard::Strict;
    }
    config.data_dir = cli
        .data_dir
        .clone()
        .or(config.data_dir)
        .or_else(|| Some(PathBuf::from(DEFAULT_DATA_DIR)));
    Ok(config)
}

fn list(board: &Board) {
    let tasks = board.tasks();
    println!("Tasks ({})", tasks.len());
    for task in &tasks {
        println!(
            "  {} | {:<9} | {:<6} | {}",
            task.id,
            task.state().as_str(),
            task.priority.to_string(),
            task.title
        );
    }
}

fn print_task(task: &Task) {
    println!("Task: {}", task.id);
    println!("  Title: {}", task.title);
    println!("  Priority: {}", task.priority);
    println!("  State: {}", task.state());
    println!("  Created: {}", task.created_at);
    for entry in task.history() {
        println!("    {} {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S"), entry.action);
    }
}

/// Only transient failures are re-enqueued; everything else is returned as is.
async fn move_with_retries(
    board: &Board,
    id: TaskId,
    target: WorkflowState,
    retries: u32,
) -> ratify_core::Result<Task> {
    let mut attempt = 0;
    loop {
        match board.request_transition(id, target).outcome().await {
            Err(err) if err.is_retryable() && attempt < retries => {
                attempt += 1;
                warn!(task = %id, %target, attempt, error = %err, "retrying transition");
            }
            outcome => return outcome,
        }
    }
}

async fn demo(app: &App) -> Result<()> {
    let board = &app.board;
    let path = [
        WorkflowState::Submitted,
        WorkflowState::InReview,
        WorkflowState::Approved,
        WorkflowState::Completed,
    ];

    let mut created = Vec::new();
    for (title, priority) in [
        ("Quarterly budget", Priority::High),
        ("Vendor contract", Priority::Medium),
        ("Team offsite", Priority::Low),
    ] {
        created.push(board.create_task(title, priority)?);
    }

    let mut walkers = JoinSet::new();
    for ticket in created {
        let task = ticket.outcome().await?;
        println!("Created {} - {}", task.id, task.title);
        let board = board.clone();
        walkers.spawn(async move {
            for target in path {
                move_with_retries(&board, task.id, target, 3).await?;
            }
            Ok::<_, ratify_core::Error>(task.id)
        });
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    while !walkers.is_empty() {
        tokio::select! {
            Some(joined) = walkers.join_next() => match joined.context("demo walker panicked")? {
                Ok(id) => info!(task = %id, "workflow completed"),
                Err(err) => println!("  gave up: {err}"),
            },
            _ = ticker.tick() => println!("  [{}]", board.status()),
        }
    }

    board.wait_idle().await;
    println!("{}", board.status());
    list(board);
    Ok(())
}
