//! Integration tests for the node: LMDB-backed lifecycle runs, restart
//! persistence and the tick scheduler.

use std::sync::Arc;
use std::time::Duration;

use veranode_lifecycle::{AdmissionError, FallbackOracle, LifecycleEngine, LifecycleParams};
use veranode_node::{NodeConfig, NodeError, NodeMetrics, ShutdownController, TickScheduler, VeraNode};
use veranode_nullables::{NullOracle, NullStore};
use veranode_store::{LedgerStore, LifecycleStore, ProfileStore, RumorStore};
use veranode_types::{Area, ProfileId, RumorId, RumorState, Secret, Timestamp, Verdict};

const HOUR: u64 = 3600;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn temp_config() -> (tempfile::TempDir, NodeConfig) {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = NodeConfig {
        data_dir: dir.path().join("db"),
        map_size_mb: 64,
        ..NodeConfig::default()
    };
    (dir, config)
}

fn open(config: &NodeConfig) -> VeraNode {
    VeraNode::open_with_oracle(config.clone(), Arc::new(FallbackOracle)).expect("open node")
}

/// A rumor in `Area::Seecs` with one within-area FACT vote and one
/// outside LIE vote.
fn rumor_with_votes(node: &VeraNode) -> RumorId {
    let author = node.register_profile(Area::Seecs).unwrap();
    let rumor = node
        .post_rumor(&author.id, &Secret::new("author"), "the gym reopens on monday", Area::Seecs)
        .unwrap();
    let inside = node.register_profile(Area::Seecs).unwrap();
    let outside = node.register_profile(Area::Nbs).unwrap();
    node.admit_vote(&inside.id, &Secret::new("inside"), &rumor.id, Verdict::Fact)
        .unwrap();
    node.admit_vote(&outside.id, &Secret::new("outside"), &rumor.id, Verdict::Lie)
        .unwrap();
    rumor.id
}

fn after_deadline() -> Timestamp {
    Timestamp::now().plus_secs(49 * HOUR)
}

fn state(node: &VeraNode, rumor: &RumorId) -> RumorState {
    node.store.rumor_store().get_rumor(rumor).unwrap().state()
}

// ---------------------------------------------------------------------------
// 1. Full lifecycle on LMDB
// ---------------------------------------------------------------------------

#[test]
fn rumor_is_locked_finalized_and_recorded() {
    let (_dir, config) = temp_config();
    let node = open(&config);
    let rumor = rumor_with_votes(&node);

    assert_eq!(node.published_tally(&rumor).unwrap(), None);

    let now = after_deadline();
    let locked = node.run_lock_tick(now).unwrap();
    assert_eq!(locked.locked, vec![rumor]);
    assert_eq!(state(&node, &rumor), RumorState::Locked);

    let finalized = node.run_finalize_tick(now).unwrap();
    assert_eq!(finalized.finalized.len(), 1);
    assert_eq!(finalized.finalized[0].decision, Verdict::Fact);
    assert_eq!(finalized.votes_erased, 2);
    assert_eq!(state(&node, &rumor), RumorState::Finalized);

    let tally = node.published_tally(&rumor).unwrap().expect("published after finalization");
    assert_eq!(tally.total_votes, 2);
    assert_eq!(tally.fact_weight, 151.0);

    let chain = node.verify_ledger().unwrap();
    assert!(chain.valid);
    let stats = node.ledger_stats().unwrap();
    assert_eq!(stats.total_blocks, 1);
    assert_eq!(stats.fact_decisions, 1);

    assert_eq!(node.metrics.rumors_finalized.get(), 1);
    assert_eq!(node.metrics.ledger_height.get(), 1);
    assert!(node
        .metrics_text()
        .unwrap()
        .contains("veranode_votes_erased_total 2"));
}

#[test]
fn double_vote_is_rejected_through_node() {
    let (_dir, config) = temp_config();
    let node = open(&config);
    let author = node.register_profile(Area::Asab).unwrap();
    let rumor = node
        .post_rumor(&author.id, &Secret::new("a"), "exam results come out early", Area::Asab)
        .unwrap();
    let voter = node.register_profile(Area::Asab).unwrap();
    let secret = Secret::new("voter");

    node.admit_vote(&voter.id, &secret, &rumor.id, Verdict::Fact).unwrap();
    let err = node
        .admit_vote(&voter.id, &secret, &rumor.id, Verdict::Fact)
        .unwrap_err();
    assert!(matches!(err, NodeError::Admission(AdmissionError::AlreadyVoted)));
    assert!(node.has_voted(&secret, &rumor.id).unwrap());
}

#[test]
fn extension_from_oracle_keeps_votes() {
    let (_dir, config) = temp_config();
    let node = VeraNode::open_with_oracle(config, Arc::new(NullOracle::extending())).unwrap();
    let rumor = rumor_with_votes(&node);

    let now = after_deadline();
    node.run_lock_tick(now).unwrap();
    let report = node.run_finalize_tick(now).unwrap();

    assert_eq!(report.extended, vec![rumor]);
    assert_eq!(state(&node, &rumor), RumorState::Active);
    assert_eq!(node.ledger_stats().unwrap().total_blocks, 0);
    assert_eq!(node.metrics.rumors_extended.get(), 1);
}

// ---------------------------------------------------------------------------
// 2. Persistence across restarts
// ---------------------------------------------------------------------------

#[test]
fn ledger_survives_restart() {
    let (_dir, config) = temp_config();
    let rumor = {
        let node = open(&config);
        let rumor = rumor_with_votes(&node);
        let now = after_deadline();
        node.run_lock_tick(now).unwrap();
        node.run_finalize_tick(now).unwrap();
        rumor
    };

    let node = open(&config);
    assert_eq!(state(&node, &rumor), RumorState::Finalized);
    assert_eq!(node.metrics.ledger_height.get(), 1);
    let chain = node.verify_ledger().unwrap();
    assert!(chain.valid);
    assert_eq!(chain.broken_at, None);
}

// ---------------------------------------------------------------------------
// 3. Opening
// ---------------------------------------------------------------------------

#[test]
fn invalid_config_is_rejected_before_opening() {
    let (_dir, mut config) = temp_config();
    config.within_area_threshold = 2.0;
    assert!(matches!(VeraNode::open(config.clone()), Err(NodeError::Config(_))));
    assert!(!config.data_dir.exists());
}

/// Endpoint on a port nothing listens on.
fn refused_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[test]
fn unreachable_http_oracle_falls_back() {
    let (_dir, mut config) = temp_config();
    config.oracle_endpoint = Some(refused_endpoint());
    let node = VeraNode::open(config).unwrap();
    let rumor = rumor_with_votes(&node);

    let now = after_deadline();
    node.run_lock_tick(now).unwrap();
    let report = node.run_finalize_tick(now).unwrap();
    assert_eq!(report.oracle_fallbacks, 1);
    assert_eq!(report.finalized[0].rumor_id, rumor);
    assert_eq!(node.metrics.oracle_fallbacks.get(), 1);
}

#[tokio::test]
async fn finalize_tick_from_async_code_with_http_oracle() {
    let (_dir, mut config) = temp_config();
    config.oracle_endpoint = Some(refused_endpoint());
    let node = VeraNode::open(config).unwrap();
    let rumor = rumor_with_votes(&node);

    let now = after_deadline();
    node.run_lock_tick(now).unwrap();
    let report = node.run_finalize_tick(now).unwrap();
    assert_eq!(report.oracle_fallbacks, 1);
    assert_eq!(state(&node, &rumor), RumorState::Finalized);
}

#[test]
fn existing_dir_without_database_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let config = NodeConfig {
        data_dir: dir.path().to_path_buf(),
        map_size_mb: 64,
        ..NodeConfig::default()
    };
    assert!(matches!(
        VeraNode::open_with_oracle(config, Arc::new(FallbackOracle)),
        Err(NodeError::Integrity(_))
    ));
}

// ---------------------------------------------------------------------------
// 4. Scheduler
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scheduler_locks_and_finalizes_expired_rumors() {
    let (_dir, config) = temp_config();
    let node = open(&config);
    let engine = Arc::clone(&node.engine);

    // posted 50 hours ago, voted on just before the deadline
    let posted = Timestamp::new(Timestamp::now().as_secs() - 50 * HOUR);
    let author = engine.register_profile(Area::Scme, posted).unwrap();
    let rumor = engine
        .post_rumor(&author.id, &Secret::new("author"), "the shuttle route is changing", Area::Scme, posted)
        .unwrap();
    let voter = engine.register_profile(Area::Scme, posted).unwrap();
    engine
        .admit_vote(&voter.id, &Secret::new("voter"), &rumor.id, Verdict::Lie, posted.plus_secs(HOUR))
        .unwrap();

    let metrics = Arc::new(NodeMetrics::new().unwrap());
    let scheduler = TickScheduler::start(
        engine,
        Arc::clone(&metrics),
        Duration::from_millis(20),
        Duration::from_millis(50),
        Arc::new(ShutdownController::new()),
    );

    let mut finalized = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if state(&node, &rumor.id) == RumorState::Finalized {
            finalized = true;
            break;
        }
    }
    assert!(scheduler.stop(Duration::from_secs(5)).await);

    assert!(finalized, "scheduler never finalized the rumor");
    assert!(metrics.rumors_locked.get() >= 1);
    assert_eq!(metrics.rumors_finalized.get(), 1);
    assert_eq!(metrics.ledger_height.get(), 1);
    // LIE verdict: author penalized
    let author = node.store.profile_store().get_profile(&author.id).unwrap();
    assert_eq!(author.points, 50);
}

/// An SCME rumor posted 50 hours ago with one within-area FACT vote; the
/// next lock tick locks it. Returns the voter and the rumor.
fn expired_rumor<S: LifecycleStore>(engine: &LifecycleEngine<S>) -> (ProfileId, RumorId) {
    let posted = Timestamp::new(Timestamp::now().as_secs() - 50 * HOUR);
    let author = engine.register_profile(Area::Scme, posted).unwrap();
    let rumor = engine
        .post_rumor(&author.id, &Secret::new("author"), "the shuttle route is changing", Area::Scme, posted)
        .unwrap();
    let voter = engine.register_profile(Area::Scme, posted).unwrap();
    engine
        .admit_vote(&voter.id, &Secret::new("voter"), &rumor.id, Verdict::Fact, posted.plus_secs(HOUR))
        .unwrap();
    (voter.id, rumor.id)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_waits_for_tick_in_flight() {
    let (_dir, config) = temp_config();
    let oracle = Arc::new(NullOracle::finalizing().with_delay(Duration::from_millis(800)));
    let node = VeraNode::open_with_oracle(config, oracle.clone()).unwrap();
    let (_, rumor) = expired_rumor(&*node.engine);

    let metrics = Arc::new(NodeMetrics::new().unwrap());
    let scheduler = TickScheduler::start(
        Arc::clone(&node.engine),
        Arc::clone(&metrics),
        Duration::from_millis(20),
        Duration::from_millis(50),
        Arc::new(ShutdownController::new()),
    );
    for _ in 0..200 {
        if oracle.calls() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(oracle.calls(), 1, "finalize tick never reached the oracle");
    assert_eq!(state(&node, &rumor), RumorState::Locked);

    assert!(scheduler.stop(Duration::from_secs(5)).await);
    assert_eq!(state(&node, &rumor), RumorState::Finalized);
    assert_eq!(node.ledger_stats().unwrap().total_blocks, 1);
    assert!(metrics.ticks.with_label_values(&["finalize"]).get() >= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scheduler_keeps_ticking_after_a_failed_tick() {
    let store = Arc::new(NullStore::new());
    let engine = Arc::new(LifecycleEngine::new(
        store.clone(),
        Arc::new(NullOracle::finalizing()),
        LifecycleParams::default(),
    ));
    let (voter, rumor) = expired_rumor(&*engine);
    store.fail_ledger_appends(true);

    let metrics = Arc::new(NodeMetrics::new().unwrap());
    let scheduler = TickScheduler::start(
        Arc::clone(&engine),
        Arc::clone(&metrics),
        Duration::from_millis(10),
        Duration::from_millis(20),
        Arc::new(ShutdownController::new()),
    );
    let failed = || metrics.ticks_failed.with_label_values(&["finalize"]).get();
    for _ in 0..200 {
        if failed() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(failed() > 0, "finalize tick never failed");
    assert_eq!(store.rumor_store().get_rumor(&rumor).unwrap().state(), RumorState::Locked);

    store.fail_ledger_appends(false);
    let mut finalized = false;
    for _ in 0..200 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if store.rumor_store().get_rumor(&rumor).unwrap().state() == RumorState::Finalized {
            finalized = true;
            break;
        }
    }
    assert!(scheduler.stop(Duration::from_secs(5)).await);

    assert!(finalized, "scheduler stopped ticking after the failure");
    assert_eq!(metrics.rumors_finalized.get(), 1);
    assert_eq!(store.ledger_store().block_count().unwrap(), 1);
    // rolled-back attempts settled nothing
    assert_eq!(store.profile_store().get_profile(&voter).unwrap().points, 110);
}

#[tokio::test]
async fn start_and_stop_lifecycle() {
    let (_dir, config) = temp_config();
    let mut node = open(&config);

    assert!(matches!(node.stop().await, Err(NodeError::NotStarted)));
    node.start().await.unwrap();
    assert!(node.is_running());
    assert!(matches!(node.start().await, Err(NodeError::AlreadyStarted)));
    node.stop().await.unwrap();
    assert!(!node.is_running());
    assert!(node.shutdown.is_triggered());

    node.start().await.unwrap();
    assert!(!node.shutdown.is_triggered());
    node.stop().await.unwrap();
}
