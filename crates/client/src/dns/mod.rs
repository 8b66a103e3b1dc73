//! DNS liveness probing.
//!
//! A host is live when an address lookup completes successfully before its
//! timeout. The lookup and the timer race inside `tokio::time::timeout`, so
//! each probe settles exactly once: a late resolution is dropped with the
//! future, and a resolution that wins cancels the timer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use subdex_core::Host;

use crate::batch::join_bounded;

/// Address resolution seam.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Whether `host` resolves to at least one address.
    async fn resolves(&self, host: &str) -> bool;
}

/// The system resolver, address lookup only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolves(&self, host: &str) -> bool {
        match tokio::net::lookup_host((host, 0)).await {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(e) => {
                tracing::debug!(host, error = %e, "lookup failed");
                false
            }
        }
    }
}

/// Probe one host, bounded by `timeout`.
pub async fn probe(resolver: &dyn HostResolver, host: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, resolver.resolves(host)).await {
        Ok(live) => live,
        Err(_) => {
            tracing::debug!(host, timeout_ms = timeout.as_millis() as u64, "lookup timed out");
            false
        }
    }
}

/// Concurrent liveness filter over candidate hosts.
#[derive(Clone)]
pub struct LivenessProber {
    resolver: Arc<dyn HostResolver>,
    timeout: Duration,
    max_concurrency: usize,
}

impl LivenessProber {
    pub fn new(resolver: Arc<dyn HostResolver>, timeout: Duration, max_concurrency: usize) -> Self {
        Self { resolver, timeout, max_concurrency }
    }

    /// Keep the hosts that resolve, in input order.
    pub async fn live_hosts(&self, candidates: Vec<Host>) -> Vec<Host> {
        let start = Instant::now();
        let total = candidates.len();
        let timeout = self.timeout;

        let checked = join_bounded(candidates, self.max_concurrency, |host| {
            let resolver = self.resolver.clone();
            async move {
                let live = probe(resolver.as_ref(), host.as_str(), timeout).await;
                (host, live)
            }
        })
        .await;

        let live: Vec<Host> = checked.into_iter().filter(|(_, ok)| *ok).map(|(host, _)| host).collect();

        tracing::info!(
            candidates = total,
            live = live.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "liveness probing completed"
        );

        live
    }
}
