//! HTTP client for the moderation endpoint.

use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};
use veranode_lifecycle::{ModerationOracle, ModerationRequest, ModerationVerdict, OracleError};

/// Default timeout for a moderation request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the moderation oracle.
///
/// Sends `POST {endpoint}/moderate` with a camelCase JSON
/// [`ModerationRequest`] and expects a camelCase [`ModerationVerdict`].
///
/// Requests run on a private current-thread runtime, so
/// [`ModerationOracle::moderate`] can be called from any thread: a plain
/// or blocking-pool thread drives the request directly; a thread already
/// inside a tokio context hands it to a scoped thread and waits.
pub struct HttpModerationOracle {
    /// HTTP client (no idle pooling: the private runtime is only driven
    /// during a call).
    http_client: reqwest::Client,
    url: String,
    /// Taken on drop; dropping a runtime blocks, which panics inside async code.
    runtime: Option<Runtime>,
}

impl HttpModerationOracle {
    /// Create a client with the default timeouts.
    pub fn new(endpoint: &str) -> Result<Self, OracleError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, OracleError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| OracleError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .thread_name("veranode-oracle")
            .build()
            .map_err(|e| OracleError::Unavailable(format!("failed to build oracle runtime: {e}")))?;
        Ok(Self {
            http_client,
            url: format!("{}/moderate", endpoint.trim_end_matches('/')),
            runtime: Some(runtime),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `POST {endpoint}/moderate` -> ModerationVerdict
    async fn send(&self, request: &ModerationRequest) -> Result<ModerationVerdict, OracleError> {
        let response = self
            .http_client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(map_request_error)?;

        if !response.status().is_success() {
            return Err(OracleError::Unavailable(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        response.json::<ModerationVerdict>().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout
            } else {
                OracleError::InvalidResponse(format!("failed to parse moderation response: {e}"))
            }
        })
    }

    /// Run one request to completion from synchronous code.
    fn drive(&self, request: &ModerationRequest) -> Result<ModerationVerdict, OracleError> {
        let Some(runtime) = self.runtime.as_ref() else {
            return Err(OracleError::Unavailable("oracle runtime shut down".to_string()));
        };
        if Handle::try_current().is_err() {
            return runtime.block_on(self.send(request));
        }
        // A thread inside a tokio context may not block_on another runtime.
        std::thread::scope(|scope| {
            scope
                .spawn(|| runtime.block_on(self.send(request)))
                .join()
                .unwrap_or_else(|_| {
                    Err(OracleError::Unavailable(
                        "oracle request thread panicked".to_string(),
                    ))
                })
        })
    }
}

impl ModerationOracle for HttpModerationOracle {
    fn moderate(&self, request: &ModerationRequest) -> Result<ModerationVerdict, OracleError> {
        if request.total_votes == 0 {
            return Ok(ModerationVerdict {
                is_ambiguous: true,
                should_extend: true,
                reason: "No votes received".to_string(),
            });
        }
        let verdict = self.drive(request)?;
        tracing::debug!(
            should_extend = verdict.should_extend,
            reason = %verdict.reason,
            "moderation oracle answered"
        );
        Ok(verdict)
    }
}

impl Drop for HttpModerationOracle {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

fn map_request_error(e: reqwest::Error) -> OracleError {
    if e.is_timeout() {
        OracleError::Timeout
    } else if e.is_connect() {
        OracleError::Unavailable(format!("connection failed: {e}"))
    } else {
        OracleError::Unavailable(e.to_string())
    }
}
