//! Node configuration with TOML file support.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use veranode_lifecycle::{params, FinalizeFailurePolicy, LifecycleParams};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a VeraNode service.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default, so
/// an empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Minutes between lock ticks.
    #[serde(default = "default_lock_check_interval")]
    pub lock_check_interval_minutes: u64,

    /// Minutes between finalize ticks. Should exceed the lock interval.
    #[serde(default = "default_finalize_check_interval")]
    pub finalize_check_interval_minutes: u64,

    /// Share of within-area votes needed to lock, in [0, 1].
    #[serde(default = "default_within_area_threshold")]
    pub within_area_threshold: f64,

    #[serde(default = "default_voting_duration_hours")]
    pub voting_duration_hours: u64,

    #[serde(default = "default_extension_hours")]
    pub extension_hours: u64,

    #[serde(default = "default_initial_points")]
    pub initial_points: i64,

    #[serde(default = "default_correct_vote_points")]
    pub correct_vote_points: i64,

    #[serde(default = "default_incorrect_vote_penalty")]
    pub incorrect_vote_penalty: i64,

    #[serde(default = "default_lie_rumor_penalty")]
    pub lie_rumor_penalty: i64,

    #[serde(default = "default_blocking_threshold")]
    pub blocking_threshold: i64,

    /// `atomic` or `best_effort`.
    #[serde(default)]
    pub finalize_failure_policy: FinalizeFailurePolicy,

    /// Base URL of the moderation oracle. Without one the deterministic
    /// fallback decides every extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle_endpoint: Option<String>,

    #[serde(default = "default_oracle_timeout_secs")]
    pub oracle_timeout_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./veranode_data")
}

fn default_map_size_mb() -> usize {
    1024
}

fn default_lock_check_interval() -> u64 {
    5
}

fn default_finalize_check_interval() -> u64 {
    10
}

fn default_within_area_threshold() -> f64 {
    params::DEFAULT_WITHIN_AREA_THRESHOLD
}

fn default_voting_duration_hours() -> u64 {
    params::DEFAULT_VOTING_DURATION_SECS / 3600
}

fn default_extension_hours() -> u64 {
    params::DEFAULT_EXTENSION_SECS / 3600
}

fn default_initial_points() -> i64 {
    params::DEFAULT_INITIAL_POINTS
}

fn default_correct_vote_points() -> i64 {
    params::DEFAULT_CORRECT_VOTE_POINTS
}

fn default_incorrect_vote_penalty() -> i64 {
    params::DEFAULT_INCORRECT_VOTE_PENALTY
}

fn default_lie_rumor_penalty() -> i64 {
    params::DEFAULT_LIE_RUMOR_PENALTY
}

fn default_blocking_threshold() -> i64 {
    params::DEFAULT_BLOCKING_THRESHOLD
}

fn default_oracle_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Reject values the scheduler or engine cannot run with.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.lock_check_interval_minutes == 0 || self.finalize_check_interval_minutes == 0 {
            return Err(NodeError::Config(
                "tick intervals must be at least one minute".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.within_area_threshold) {
            return Err(NodeError::Config(format!(
                "within_area_threshold must be in [0, 1], got {}",
                self.within_area_threshold
            )));
        }
        if self.voting_duration_hours == 0 {
            return Err(NodeError::Config(
                "voting_duration_hours must be positive".to_string(),
            ));
        }
        if self.extension_hours == 0 {
            return Err(NodeError::Config(
                "extension_hours must be positive".to_string(),
            ));
        }
        if self.map_size_mb == 0 {
            return Err(NodeError::Config("map_size_mb must be positive".to_string()));
        }
        checked_scale("voting_duration_hours", self.voting_duration_hours, 3600)?;
        checked_scale("extension_hours", self.extension_hours, 3600)?;
        checked_scale("lock_check_interval_minutes", self.lock_check_interval_minutes, 60)?;
        checked_scale(
            "finalize_check_interval_minutes",
            self.finalize_check_interval_minutes,
            60,
        )?;
        self.map_size_mb.checked_mul(1024 * 1024).ok_or_else(|| {
            NodeError::Config(format!("map_size_mb {} is too large", self.map_size_mb))
        })?;
        if self.oracle_timeout_secs == 0 {
            return Err(NodeError::Config(
                "oracle_timeout_secs must be positive".to_string(),
            ));
        }
        if self.finalize_check_interval_minutes <= self.lock_check_interval_minutes {
            tracing::warn!(
                lock = self.lock_check_interval_minutes,
                finalize = self.finalize_check_interval_minutes,
                "finalize interval does not exceed lock interval"
            );
        }
        Ok(())
    }

    pub fn lifecycle_params(&self) -> LifecycleParams {
        LifecycleParams {
            within_area_threshold: self.within_area_threshold,
            voting_duration_secs: self.voting_duration_hours.saturating_mul(3600),
            extension_secs: self.extension_hours.saturating_mul(3600),
            initial_points: self.initial_points,
            correct_vote_points: self.correct_vote_points,
            incorrect_vote_penalty: self.incorrect_vote_penalty,
            lie_rumor_penalty: self.lie_rumor_penalty,
            blocking_threshold: self.blocking_threshold,
            finalize_failure_policy: self.finalize_failure_policy,
        }
    }

    pub fn lock_check_interval(&self) -> Duration {
        Duration::from_secs(self.lock_check_interval_minutes.saturating_mul(60))
    }

    pub fn finalize_check_interval(&self) -> Duration {
        Duration::from_secs(self.finalize_check_interval_minutes.saturating_mul(60))
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }
}

fn checked_scale(field: &str, value: u64, factor: u64) -> Result<u64, NodeError> {
    value
        .checked_mul(factor)
        .ok_or_else(|| NodeError::Config(format!("{field} {value} is too large")))
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            lock_check_interval_minutes: default_lock_check_interval(),
            finalize_check_interval_minutes: default_finalize_check_interval(),
            within_area_threshold: default_within_area_threshold(),
            voting_duration_hours: default_voting_duration_hours(),
            extension_hours: default_extension_hours(),
            initial_points: default_initial_points(),
            correct_vote_points: default_correct_vote_points(),
            incorrect_vote_penalty: default_incorrect_vote_penalty(),
            lie_rumor_penalty: default_lie_rumor_penalty(),
            blocking_threshold: default_blocking_threshold(),
            finalize_failure_policy: FinalizeFailurePolicy::default(),
            oracle_endpoint: None,
            oracle_timeout_secs: default_oracle_timeout_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
