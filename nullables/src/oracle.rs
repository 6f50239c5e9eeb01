//! Nullable moderation oracle: scripted answers, recorded requests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use veranode_lifecycle::{ModerationOracle, ModerationRequest, ModerationVerdict, OracleError};

/// One scripted oracle answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OracleBehavior {
    /// Not ambiguous, do not extend.
    Finalize,
    /// Ambiguous, extend.
    Extend,
    /// Fail as if the oracle were unreachable.
    Unavailable,
}

/// A moderation oracle for testing.
///
/// Answers from the script in order, then repeats the default behavior.
pub struct NullOracle {
    default: OracleBehavior,
    delay: Duration,
    script: Mutex<VecDeque<OracleBehavior>>,
    requests: Mutex<Vec<ModerationRequest>>,
}

impl NullOracle {
    pub fn new(default: OracleBehavior) -> Self {
        Self {
            default,
            delay: Duration::ZERO,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn finalizing() -> Self {
        Self::new(OracleBehavior::Finalize)
    }

    pub fn extending() -> Self {
        Self::new(OracleBehavior::Extend)
    }

    pub fn unavailable() -> Self {
        Self::new(OracleBehavior::Unavailable)
    }

    /// Queue answers to give before falling back to the default.
    pub fn then(self, answers: impl IntoIterator<Item = OracleBehavior>) -> Self {
        self.script.lock().unwrap().extend(answers);
        self
    }

    /// Sleep this long in every call, after the request is recorded.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ModerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl ModerationOracle for NullOracle {
    fn moderate(&self, request: &ModerationRequest) -> Result<ModerationVerdict, OracleError> {
        self.requests.lock().unwrap().push(request.clone());
        let behavior = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        match behavior {
            OracleBehavior::Finalize => Ok(ModerationVerdict {
                is_ambiguous: false,
                should_extend: false,
                reason: "null oracle: finalize".to_string(),
            }),
            OracleBehavior::Extend => Ok(ModerationVerdict {
                is_ambiguous: true,
                should_extend: true,
                reason: "null oracle: extend".to_string(),
            }),
            OracleBehavior::Unavailable => {
                Err(OracleError::Unavailable("null oracle offline".to_string()))
            }
        }
    }
}
