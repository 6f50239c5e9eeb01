//! VeraNode service.
//!
//! Wires the LMDB store, the rumor lifecycle engine and the moderation
//! oracle together and drives the engine with two periodic ticks:
//! - lock-check (default every 5 minutes) closes voting on expired rumors;
//! - finalize-check (default every 10 minutes) moderates, decides and
//!   records locked rumors.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod scheduler;
pub mod shutdown;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::VeraNode;
pub use scheduler::{finalize_tick, lock_tick, TickKind, TickScheduler};
pub use shutdown::{ShutdownController, ShutdownListener, ShutdownReason};
