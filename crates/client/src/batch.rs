//! Bounded concurrent fan-out with a batch join.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Run `f` for every item with at most `limit` futures in flight.
///
/// Waits for every task to settle and returns the outputs in input order.
/// A task that panics is logged and left out; it never cancels its siblings.
pub async fn join_bounded<T, R, F, Fut>(items: impl IntoIterator<Item = T>, limit: usize, f: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut join_set = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let task = f(item);
        let semaphore = semaphore.clone();

        join_set.spawn(async move {
            // NOTE: Hold permit for task duration to enforce concurrency limit
            let _permit = semaphore.acquire_owned().await.ok();
            (index, task.await)
        });
    }

    let mut results = Vec::with_capacity(join_set.len());
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(output) => results.push(output),
            Err(e) => tracing::warn!(error = %e, "fan-out task failed"),
        }
    }

    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, output)| output).collect()
}
