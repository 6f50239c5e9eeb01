//! Periodic lock and finalize ticks.
//!
//! Each tick kind runs in its own task on a fixed period. The tick itself
//! is a blocking LMDB transaction (plus, for finalize, synchronous oracle
//! calls), so it runs under `spawn_blocking` and is awaited inside the
//! `select!` arm: a shutdown signal is only observed between ticks, never
//! in the middle of a transaction.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use veranode_lifecycle::{FinalizeTickReport, LifecycleEngine, LifecycleError, LockTickReport};
use veranode_store::{LedgerStore, LifecycleStore};
use veranode_types::Timestamp;

use crate::metrics::NodeMetrics;
use crate::shutdown::{ShutdownController, ShutdownListener};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickKind {
    Lock,
    Finalize,
}

impl TickKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TickKind::Lock => "lock",
            TickKind::Finalize => "finalize",
        }
    }
}

/// Run a lock tick and record it. A failure has already been rolled back
/// by the engine; it is logged and counted here.
pub fn lock_tick<S: LifecycleStore>(
    engine: &LifecycleEngine<S>,
    metrics: &NodeMetrics,
    now: Timestamp,
) -> Result<LockTickReport, LifecycleError> {
    let started = Instant::now();
    match engine.run_lock_tick(now) {
        Ok(report) => {
            metrics.record_lock_tick(&report, started.elapsed());
            Ok(report)
        }
        Err(e) => Err(tick_failed(TickKind::Lock, metrics, e)),
    }
}

/// Run a finalize tick and record it, refreshing the ledger height gauge.
pub fn finalize_tick<S: LifecycleStore>(
    engine: &LifecycleEngine<S>,
    metrics: &NodeMetrics,
    now: Timestamp,
) -> Result<FinalizeTickReport, LifecycleError> {
    let started = Instant::now();
    match engine.run_finalize_tick(now) {
        Ok(report) => {
            metrics.record_finalize_tick(&report, started.elapsed());
            match engine.store().ledger_store().block_count() {
                Ok(height) => metrics.ledger_height.set(height as i64),
                Err(e) => tracing::warn!(error = %e, "failed to read ledger height"),
            }
            Ok(report)
        }
        Err(e) => Err(tick_failed(TickKind::Finalize, metrics, e)),
    }
}

fn tick_failed(kind: TickKind, metrics: &NodeMetrics, e: LifecycleError) -> LifecycleError {
    metrics.record_failed_tick(kind);
    tracing::error!(tick = kind.as_str(), error = %e, "tick failed, rolled back");
    e
}

/// Owns the two tick loops.
pub struct TickScheduler {
    shutdown: Arc<ShutdownController>,
    handles: Vec<JoinHandle<()>>,
}

impl TickScheduler {
    /// Spawn both loops on the current runtime. The first tick of each kind
    /// fires one full period after start.
    pub fn start<S>(
        engine: Arc<LifecycleEngine<S>>,
        metrics: Arc<NodeMetrics>,
        lock_period: Duration,
        finalize_period: Duration,
        shutdown: Arc<ShutdownController>,
    ) -> Self
    where
        S: LifecycleStore + 'static,
    {
        let handles = vec![
            spawn_tick_loop(
                TickKind::Lock,
                lock_period,
                Arc::clone(&engine),
                Arc::clone(&metrics),
                shutdown.listener(),
            ),
            spawn_tick_loop(
                TickKind::Finalize,
                finalize_period,
                engine,
                metrics,
                shutdown.listener(),
            ),
        ];
        tracing::info!(
            lock_secs = lock_period.as_secs(),
            finalize_secs = finalize_period.as_secs(),
            "tick scheduler started"
        );
        Self { shutdown, handles }
    }

    /// Signal both loops and wait for them to exit. A tick in progress is
    /// allowed to finish its transaction first.
    pub async fn stop(self, timeout: Duration) -> bool {
        self.shutdown.shutdown();
        let wait_all = async {
            for handle in self.handles {
                if let Err(e) = handle.await {
                    tracing::error!(error = %e, "tick loop task failed");
                }
            }
        };
        match tokio::time::timeout(timeout, wait_all).await {
            Ok(()) => {
                tracing::info!("tick scheduler stopped");
                true
            }
            Err(_) => {
                tracing::warn!(?timeout, "tick scheduler did not stop in time");
                false
            }
        }
    }
}

fn spawn_tick_loop<S>(
    kind: TickKind,
    period: Duration,
    engine: Arc<LifecycleEngine<S>>,
    metrics: Arc<NodeMetrics>,
    mut shutdown: ShutdownListener,
) -> JoinHandle<()>
where
    S: LifecycleStore + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                reason = shutdown.triggered() => {
                    tracing::info!(
                        tick = kind.as_str(),
                        reason = reason.as_str(),
                        "tick loop shutting down"
                    );
                    break;
                }
                _ = interval.tick() => {
                    let engine = Arc::clone(&engine);
                    let metrics = Arc::clone(&metrics);
                    let joined = tokio::task::spawn_blocking(move || {
                        let now = Timestamp::now();
                        match kind {
                            TickKind::Lock => lock_tick(&engine, &metrics, now).map(drop),
                            TickKind::Finalize => finalize_tick(&engine, &metrics, now).map(drop),
                        }
                    })
                    .await;
                    if let Err(e) = joined {
                        tracing::error!(tick = kind.as_str(), error = %e, "tick task panicked");
                    }
                }
            }
        }
    })
}
