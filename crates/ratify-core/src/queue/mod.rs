//! Queue module: the sequential job queue and the unit-of-work abstraction.

mod job;
mod sequential;

pub use job::{FnJob, job};
pub use sequential::JobQueue;

use async_trait::async_trait;

use crate::domain::Result;

/// A deferred asynchronous operation with a human-readable label.
///
/// Design intent:
/// - The queue only sequences units; it never inspects what they do.
/// - A unit must report its outcome to its own submitter (e.g. through a
///   `Ticket`) before returning. An `Err` returned here is logged and counted
///   by the queue, nothing more.
#[async_trait]
pub trait Job: Send {
    fn label(&self) -> &str;

    async fn run(self: Box<Self>) -> Result<()>;
}
