use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use super::Job;
use crate::domain::Result;

/// Closure-backed `Job`.
pub struct FnJob<F, Fut> {
    label: String,
    f: F,
    _future: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnJob<F, Fut>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    pub fn new(label: impl Into<String>, f: F) -> Self {
        Self {
            label: label.into(),
            f,
            _future: PhantomData,
        }
    }
}

/// Wrap a closure producing a future as a boxed `Job`.
///
/// ```ignore
/// queue.enqueue(job("Save draft", move || async move {
///     store.update_task(&task).await?;
///     Ok(())
/// }));
/// ```
pub fn job<F, Fut>(label: impl Into<String>, f: F) -> Box<dyn Job>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Box::new(FnJob::new(label, f))
}

#[async_trait]
impl<F, Fut> Job for FnJob<F, Fut>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn label(&self) -> &str {
        &self.label
    }

    async fn run(self: Box<Self>) -> Result<()> {
        let FnJob { f, .. } = *self;
        f().await
    }
}
