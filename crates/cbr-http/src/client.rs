//! JSON-over-HTTP client for the identity service.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue, RETRY_AFTER};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace, warn};

use cbr_core::Endpoint;
use cbr_core::error::{Error, InvalidInputError, ServiceError, TransportError};

use crate::endpoints::{ErrorResponse, TARGET_PREFIX};

/// Header naming the operation to invoke.
const X_AMZ_TARGET: &str = "x-amz-target";

/// Body content type expected by the service.
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Backoff policy for throttled requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum retry attempts after the first request (default: 5).
    pub max_retries: u32,
    /// Delay before the first retry (default: 200ms).
    pub base_delay: Duration,
    /// Upper bound for any single delay (default: 10s).
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based), doubling each time.
    ///
    /// A server-provided `Retry-After` wins when present, still capped at
    /// `max_delay`.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = retry_after.unwrap_or_else(|| {
            self.base_delay
                .saturating_mul(2u32.saturating_pow(attempt.min(16)))
        });
        backoff.min(self.max_delay)
    }
}

/// HTTP client for identity-service operations.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    endpoint: Endpoint,
    retry: RetryPolicy,
}

impl ApiClient {
    /// Create a new client for the given endpoint.
    pub fn new(endpoint: Endpoint, retry: RetryPolicy) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cbr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(map_reqwest)?;

        Ok(Self {
            client,
            endpoint,
            retry,
        })
    }

    /// Invoke `operation` with a JSON body, retrying throttled attempts.
    #[instrument(skip(self, body), fields(endpoint = %self.endpoint))]
    pub async fn call<B, R>(&self, operation: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(|e| InvalidInputError::Other {
            message: format!("failed to encode {} request: {}", operation, e),
        })?;
        let target = format!("{}.{}", TARGET_PREFIX, operation);

        let mut attempt = 0;
        loop {
            debug!(operation, attempt, "service call");

            let response = self
                .client
                .post(self.endpoint.as_str())
                .header(X_AMZ_TARGET, &target)
                .header(CONTENT_TYPE, HeaderValue::from_static(AMZ_JSON))
                .body(payload.clone())
                .send()
                .await
                .map_err(map_reqwest)?;

            let status = response.status();
            trace!(status = %status, "service response");

            if status.is_success() {
                return response.json::<R>().await.map_err(map_reqwest);
            }

            let retry_after = parse_retry_after(response.headers().get(RETRY_AFTER));
            let error = parse_error_response(response).await;

            if error.is_throttling() && attempt < self.retry.max_retries {
                let delay = self.retry.delay_for(attempt, retry_after);
                warn!(
                    operation,
                    attempt = attempt + 1,
                    max = self.retry.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "throttled, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(Error::Service(error));
        }
    }
}

fn map_reqwest(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

fn parse_retry_after(value: Option<&HeaderValue>) -> Option<Duration> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Parse a service error response.
async fn parse_error_response(response: reqwest::Response) -> ServiceError {
    let status = response.status().as_u16();

    match response.json::<ErrorResponse>().await {
        Ok(body) => ServiceError::new(status, body.code, body.message),
        Err(_) => ServiceError::new(status, None, None),
    }
}
