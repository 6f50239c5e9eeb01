//! Prometheus metrics for the VeraNode service.
//!
//! The [`NodeMetrics`] struct owns a dedicated [`Registry`]; callers render
//! it with [`NodeMetrics::encode_text`] in the Prometheus text exposition
//! format.

use std::time::Duration;

use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_with_registry, Encoder, HistogramOpts,
    HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use veranode_lifecycle::{FinalizeTickReport, LockTickReport};

use crate::scheduler::TickKind;
use crate::NodeError;

/// Central collection of all node-level Prometheus metrics.
pub struct NodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Completed ticks, labelled `kind` = `lock` | `finalize`.
    pub ticks: IntCounterVec,
    /// Ticks that failed and were rolled back, labelled by `kind`.
    pub ticks_failed: IntCounterVec,
    pub rumors_locked: IntCounter,
    pub rumors_extended: IntCounter,
    pub rumors_finalized: IntCounter,
    /// Oracle calls answered by the local fallback instead.
    pub oracle_fallbacks: IntCounter,
    pub votes_erased: IntCounter,
    pub profiles_blocked: IntCounter,
    /// Rumors finalized without a ledger block (best-effort policy only).
    pub ledger_failures: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Current number of blocks in the ledger.
    pub ledger_height: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Wall time of one tick in milliseconds, labelled by `kind`.
    pub tick_duration_ms: HistogramVec,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Result<Self, NodeError> {
        let registry = Registry::new();

        let ticks = register_int_counter_vec_with_registry!(
            Opts::new("veranode_ticks_total", "Lifecycle ticks completed"),
            &["kind"],
            registry
        )?;
        let ticks_failed = register_int_counter_vec_with_registry!(
            Opts::new(
                "veranode_ticks_failed_total",
                "Lifecycle ticks rolled back after an error"
            ),
            &["kind"],
            registry
        )?;
        let rumors_locked = register_int_counter_with_registry!(
            Opts::new("veranode_rumors_locked_total", "Rumors moved to LOCKED"),
            registry
        )?;
        let rumors_extended = register_int_counter_with_registry!(
            Opts::new(
                "veranode_rumors_extended_total",
                "Locked rumors returned to ACTIVE by moderation"
            ),
            registry
        )?;
        let rumors_finalized = register_int_counter_with_registry!(
            Opts::new("veranode_rumors_finalized_total", "Rumors finalized"),
            registry
        )?;
        let oracle_fallbacks = register_int_counter_with_registry!(
            Opts::new(
                "veranode_oracle_fallbacks_total",
                "Moderation decisions taken by the local fallback"
            ),
            registry
        )?;
        let votes_erased = register_int_counter_with_registry!(
            Opts::new(
                "veranode_votes_erased_total",
                "Vote records deleted after finalization"
            ),
            registry
        )?;
        let profiles_blocked = register_int_counter_with_registry!(
            Opts::new(
                "veranode_profiles_blocked_total",
                "Profiles blocked by reputation settlement"
            ),
            registry
        )?;
        let ledger_failures = register_int_counter_with_registry!(
            Opts::new(
                "veranode_ledger_failures_total",
                "Rumors finalized without a ledger block"
            ),
            registry
        )?;

        let ledger_height = register_int_gauge_with_registry!(
            Opts::new("veranode_ledger_height", "Current number of ledger blocks"),
            registry
        )?;

        // 1 ms → ~16 s
        let tick_duration_ms = register_histogram_vec_with_registry!(
            HistogramOpts::new("veranode_tick_duration_ms", "Tick wall time in milliseconds")
                .buckets(prometheus::exponential_buckets(1.0, 2.0, 15)?),
            &["kind"],
            registry
        )?;

        Ok(Self {
            registry,
            ticks,
            ticks_failed,
            rumors_locked,
            rumors_extended,
            rumors_finalized,
            oracle_fallbacks,
            votes_erased,
            profiles_blocked,
            ledger_failures,
            ledger_height,
            tick_duration_ms,
        })
    }

    pub fn record_lock_tick(&self, report: &LockTickReport, elapsed: Duration) {
        self.observe(TickKind::Lock, elapsed);
        self.rumors_locked.inc_by(report.locked.len() as u64);
    }

    pub fn record_finalize_tick(&self, report: &FinalizeTickReport, elapsed: Duration) {
        self.observe(TickKind::Finalize, elapsed);
        self.rumors_extended.inc_by(report.extended.len() as u64);
        self.rumors_finalized.inc_by(report.finalized.len() as u64);
        self.oracle_fallbacks.inc_by(report.oracle_fallbacks as u64);
        self.votes_erased.inc_by(report.votes_erased as u64);
        self.profiles_blocked
            .inc_by(report.profiles_blocked.len() as u64);
        self.ledger_failures
            .inc_by(report.ledger_failures.len() as u64);
    }

    pub fn record_failed_tick(&self, kind: TickKind) {
        self.ticks_failed.with_label_values(&[kind.as_str()]).inc();
    }

    /// Render every registered metric in the text exposition format.
    pub fn encode_text(&self) -> Result<String, NodeError> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| NodeError::Config(format!("metrics not UTF-8: {e}")))
    }

    fn observe(&self, kind: TickKind, elapsed: Duration) {
        self.ticks.with_label_values(&[kind.as_str()]).inc();
        self.tick_duration_ms
            .with_label_values(&[kind.as_str()])
            .observe(elapsed.as_secs_f64() * 1000.0);
    }
}
