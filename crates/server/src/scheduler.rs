//! Periodic regeneration of the listing page.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use subdex_client::Pipeline;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Call `job` every `period`, forever.
///
/// The first call happens after one full period unless `immediate` is set.
/// A job overrunning its period delays the next tick instead of bursting.
pub async fn run_every<F, Fut>(period: Duration, immediate: bool, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // interval() yields its first tick right away
    if !immediate {
        ticker.tick().await;
    }

    loop {
        ticker.tick().await;
        job().await;
    }
}

/// Rebuild the page for the configured domain; failures are logged only.
pub async fn regenerate(pipeline: &Pipeline) {
    let config = pipeline.config();
    match pipeline.build_page(&config.domain, &config.serving_host).await {
        Ok(built) => tracing::info!(
            domain = %config.domain,
            hosts = built.hosts.len(),
            location = ?built.location,
            "scheduled regeneration completed"
        ),
        Err(e) => tracing::warn!(domain = %config.domain, error = %e, "scheduled regeneration failed"),
    }
}

/// Start the background regeneration loop.
pub fn spawn(pipeline: Arc<Pipeline>, period: Duration, immediate: bool) -> JoinHandle<()> {
    tracing::info!(period_secs = period.as_secs(), immediate, "starting regeneration scheduler");

    tokio::spawn(run_every(period, immediate, move || {
        let pipeline = pipeline.clone();
        async move { regenerate(&pipeline).await }
    }))
}
