//! The VeraNode service: storage, lifecycle engine, moderation oracle and
//! tick scheduler wired together.

use std::sync::Arc;
use std::time::Duration;

use veranode_ledger::{ChainReport, Ledger, LedgerStats};
use veranode_lifecycle::{
    AdmittedVote, FallbackOracle, FinalizeTickReport, LifecycleEngine, LockTickReport,
    ModerationOracle, Principal,
};
use veranode_oracle::HttpModerationOracle;
use veranode_store::{LedgerStore, Profile, Rumor, VoteTally};
use veranode_store_lmdb::{check_data_dir, LmdbEnvironment, Migrator};
use veranode_types::{Area, ProfileId, RumorId, Secret, Timestamp, Verdict};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::metrics::NodeMetrics;
use crate::scheduler::{finalize_tick, lock_tick, TickScheduler};
use crate::shutdown::ShutdownController;

/// Number of named LMDB databases.
const MAX_DBS: u32 = 8;
/// Timeout for waiting on the tick loops during shutdown. A finalize tick
/// may be waiting on several oracle calls.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);

/// A running VeraNode service.
pub struct VeraNode {
    pub config: NodeConfig,
    pub store: Arc<LmdbEnvironment>,
    pub engine: Arc<LifecycleEngine<LmdbEnvironment>>,
    pub ledger: Ledger<LmdbEnvironment>,
    pub metrics: Arc<NodeMetrics>,
    pub shutdown: Arc<ShutdownController>,
    scheduler: Option<TickScheduler>,
}

impl VeraNode {
    /// Open the node described by `config`.
    ///
    /// Validates the configuration, opens the LMDB environment at
    /// `config.data_dir`, checks its integrity and migrates its schema. With
    /// an `oracle_endpoint` the HTTP oracle is used; otherwise the
    /// deterministic fallback decides. Call [`start`](Self::start) to begin
    /// ticking.
    pub fn open(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        let oracle = build_oracle(&config)?;
        Self::open_with_oracle(config, oracle)
    }

    /// Like [`open`](Self::open) with an explicit moderation oracle.
    pub fn open_with_oracle(
        config: NodeConfig,
        oracle: Arc<dyn ModerationOracle>,
    ) -> Result<Self, NodeError> {
        config.validate()?;
        check_data_dir(&config.data_dir).map_err(NodeError::Integrity)?;

        let store = LmdbEnvironment::open(&config.data_dir, MAX_DBS, config.map_size_bytes())?;
        let report = store.check_integrity()?;
        if !report.is_healthy() {
            return Err(NodeError::Integrity(report.summary()));
        }
        tracing::info!(
            tables = report.tables.len(),
            entries = report.total_entries(),
            "LMDB integrity check passed"
        );
        Migrator::run(&store)?;
        let store = Arc::new(store);

        let metrics = Arc::new(NodeMetrics::new()?);
        metrics
            .ledger_height
            .set(store.ledger_store().block_count()? as i64);

        let engine = Arc::new(LifecycleEngine::new(
            Arc::clone(&store),
            oracle,
            config.lifecycle_params(),
        ));
        let ledger = Ledger::new(Arc::clone(&store));

        tracing::info!(data_dir = %config.data_dir.display(), "VeraNode opened");
        Ok(Self {
            config,
            store,
            engine,
            ledger,
            metrics,
            shutdown: Arc::new(ShutdownController::new()),
            scheduler: None,
        })
    }

    /// Start the lock and finalize tick loops on the current runtime.
    pub async fn start(&mut self) -> Result<(), NodeError> {
        if self.scheduler.is_some() {
            return Err(NodeError::AlreadyStarted);
        }
        self.shutdown.rearm();
        self.scheduler = Some(TickScheduler::start(
            Arc::clone(&self.engine),
            Arc::clone(&self.metrics),
            self.config.lock_check_interval(),
            self.config.finalize_check_interval(),
            Arc::clone(&self.shutdown),
        ));
        Ok(())
    }

    /// Start, wait for SIGINT/SIGTERM, then stop.
    pub async fn run(&mut self) -> Result<(), NodeError> {
        self.start().await?;
        let reason = self.shutdown.wait_for_signal().await;
        tracing::info!(reason = reason.as_str(), "VeraNode received shutdown");
        self.stop().await
    }

    /// Stop the tick loops (letting a running tick commit) and flush LMDB.
    pub async fn stop(&mut self) -> Result<(), NodeError> {
        let scheduler = self.scheduler.take().ok_or(NodeError::NotStarted)?;
        tracing::info!("VeraNode stopping");
        let stopped = scheduler.stop(SHUTDOWN_TIMEOUT).await;

        if let Err(e) = self.store.sync() {
            tracing::warn!(error = %e, "LMDB force_sync failed");
        } else {
            tracing::info!("LMDB flushed to disk");
        }

        if !stopped {
            return Err(NodeError::ShutdownTimeout);
        }
        tracing::info!("VeraNode stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    // ── Upward interface ────────────────────────────────────────────────

    pub fn register_profile(&self, area: Area) -> Result<Profile, NodeError> {
        Ok(self.engine.register_profile(area, Timestamp::now())?)
    }

    pub fn post_rumor(
        &self,
        author: &ProfileId,
        secret: &Secret,
        content: &str,
        area: Area,
    ) -> Result<Rumor, NodeError> {
        Ok(self
            .engine
            .post_rumor(author, secret, content, area, Timestamp::now())?)
    }

    pub fn admit_vote(
        &self,
        voter: &ProfileId,
        secret: &Secret,
        rumor: &RumorId,
        vote_type: Verdict,
    ) -> Result<AdmittedVote, NodeError> {
        Ok(self
            .engine
            .admit_vote(voter, secret, rumor, vote_type, Timestamp::now())?)
    }

    pub fn has_voted(&self, secret: &Secret, rumor: &RumorId) -> Result<bool, NodeError> {
        Ok(self.engine.has_voted(secret, rumor)?)
    }

    pub fn unblock_profile(
        &self,
        principal: &Principal,
        profile: &ProfileId,
    ) -> Result<Profile, NodeError> {
        Ok(self.engine.unblock_profile(principal, profile)?)
    }

    /// Run a lock tick immediately, outside the schedule. Blocking.
    pub fn run_lock_tick(&self, now: Timestamp) -> Result<LockTickReport, NodeError> {
        Ok(lock_tick(&self.engine, &self.metrics, now)?)
    }

    /// Run a finalize tick immediately, outside the schedule. Blocking.
    pub fn run_finalize_tick(&self, now: Timestamp) -> Result<FinalizeTickReport, NodeError> {
        Ok(finalize_tick(&self.engine, &self.metrics, now)?)
    }

    // ── Ledger ──────────────────────────────────────────────────────────

    pub fn verify_ledger(&self) -> Result<ChainReport, NodeError> {
        Ok(self.ledger.verify_integrity()?)
    }

    pub fn ledger_stats(&self) -> Result<LedgerStats, NodeError> {
        Ok(self.ledger.stats()?)
    }

    /// Aggregates for a rumor, hidden until it is final.
    pub fn published_tally(&self, rumor: &RumorId) -> Result<Option<VoteTally>, NodeError> {
        Ok(self.ledger.published_tally(rumor)?)
    }

    pub fn metrics_text(&self) -> Result<String, NodeError> {
        self.metrics.encode_text()
    }
}

fn build_oracle(config: &NodeConfig) -> Result<Arc<dyn ModerationOracle>, NodeError> {
    let Some(endpoint) = config.oracle_endpoint.as_deref() else {
        tracing::info!("no oracle endpoint configured, using deterministic fallback");
        return Ok(Arc::new(FallbackOracle));
    };
    let oracle = HttpModerationOracle::with_timeout(endpoint, config.oracle_timeout())?;
    tracing::info!(url = oracle.url(), timeout_secs = config.oracle_timeout_secs, "using HTTP moderation oracle");
    Ok(Arc::new(oracle))
}
