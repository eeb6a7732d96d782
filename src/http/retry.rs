//! Retrying request executor.
//!
//! Retries transient statuses (see [`RETRYABLE_STATUSES`](super::status::RETRYABLE_STATUSES))
//! with triangular backoff: the n-th retry waits `base * n`, so n retries
//! sleep `base * (1 + 2 + ... + n)` in total.
//! Permanent failures are returned on the first attempt.

use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderName, HeaderValue};

use super::request::PreparedRequest;
use super::status::{StatusClass, classify};
use super::transport::{RawResponse, Transport};
use crate::error::{Error, Result};
use crate::runtime::Runtime;

/// Upper bound on retries, whatever the configuration asks for.
pub const MAX_RETRIES_CAP: u32 = 5;

/// Default number of retries (4 attempts in total).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base sleep unit in milliseconds.
pub const DEFAULT_RETRY_SLEEP_MS: u64 = 500;

/// Header carrying the retry attempt number, sent from the first retry on.
pub const RETRY_COUNT_HEADER: &str = "x-tio-retry-count";

/// Bounded retry configuration for a single logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_sleep: Duration,
}

impl RetryPolicy {
    /// `max_retries` is clamped to [`MAX_RETRIES_CAP`].
    pub fn new(max_retries: u32, base_sleep: Duration) -> Self {
        Self {
            max_retries: max_retries.min(MAX_RETRIES_CAP),
            base_sleep,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub fn base_sleep(&self) -> Duration {
        self.base_sleep
    }

    /// Sleep before the `attempt`-th retry (1-based): `base * attempt`,
    /// saturating at `Duration::MAX`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.base_sleep.saturating_mul(attempt)
    }

    /// Time slept once `retries` retries have been made: `base * (1 + 2 + .. + retries)`.
    pub fn total_delay(&self, retries: u32) -> Duration {
        let steps = retries.saturating_mul(retries.saturating_add(1)) / 2;
        self.base_sleep.saturating_mul(steps)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_RETRIES,
            Duration::from_millis(DEFAULT_RETRY_SLEEP_MS),
        )
    }
}

/// Sends `request` through `transport`, retrying transient failures.
///
/// Returns the first 2xx response. Any other status ends in [`Error::Api`]
/// carrying the status and body of the last attempt.
#[tracing::instrument(skip_all, fields(signature = %request.signature()))]
pub fn execute(
    transport: &dyn Transport,
    runtime: &dyn Runtime,
    policy: &RetryPolicy,
    request: &PreparedRequest,
) -> Result<RawResponse> {
    let mut attempt: u32 = 0;
    let mut cumulative_delay = Duration::ZERO;

    loop {
        let response = if attempt == 0 {
            transport.send(request)?
        } else {
            let mut retry = request.clone();
            retry.headers.insert(
                HeaderName::from_static(RETRY_COUNT_HEADER),
                HeaderValue::from(attempt),
            );
            transport.send(&retry)?
        };

        let classification = classify(response.status);
        match classification.class {
            StatusClass::Success => return Ok(response),
            StatusClass::Permanent => {
                debug!(
                    "{}: non-retryable status {}",
                    request.signature(),
                    response.status
                );
                return Err(api_error(response, classification.code, attempt + 1));
            }
            StatusClass::Retryable => {
                if attempt >= policy.max_retries() {
                    return Err(api_error(response, classification.code, attempt + 1));
                }

                attempt += 1;
                let delay = policy.delay_before(attempt);
                cumulative_delay = cumulative_delay.saturating_add(delay);
                warn!(
                    "Retry {}/{} in {}ms ({}ms total) after {} ({}): {}",
                    attempt,
                    policy.max_retries(),
                    delay.as_millis(),
                    cumulative_delay.as_millis(),
                    response.status,
                    classification.code,
                    request.signature()
                );
                runtime.sleep(delay);
            }
        }
    }
}

fn api_error(response: RawResponse, code: super::ErrorCode, attempts: u32) -> Error {
    let status = response.status;
    let body = response.text().unwrap_or_default();
    Error::Api {
        status,
        code,
        body,
        attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::ApiRequest;
    use crate::http::transport::MockTransport;
    use crate::test_utils::{FakeRuntime, ScriptedTransport};
    use url::Url;

    fn request() -> PreparedRequest {
        let base = Url::parse("https://cloud.example.com/").unwrap();
        ApiRequest::get("scans/{scan_id}")
            .path("scan_id", 1)
            .prepare(&base)
            .unwrap()
    }

    fn policy(max_retries: u32, base_ms: u64) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(base_ms))
    }

    #[test]
    fn test_success_on_first_attempt() {
        let transport = ScriptedTransport::new().respond(200, r#"{"ok": true}"#);
        let runtime = FakeRuntime::new();

        let response = execute(&transport, &runtime, &policy(3, 100), &request()).unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(transport.request_count(), 1);
        assert!(runtime.sleeps().is_empty());
    }

    #[test]
    fn test_three_503_then_200() {
        let transport = ScriptedTransport::new()
            .respond(503, "busy")
            .respond(503, "busy")
            .respond(503, "busy")
            .respond(200, "{}");
        let runtime = FakeRuntime::new();

        let response = execute(&transport, &runtime, &policy(3, 100), &request()).unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(transport.request_count(), 4);
        assert_eq!(runtime.total_slept(), Duration::from_millis(600));
        assert_eq!(
            runtime.sleeps(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(300),
            ]
        );
    }

    #[test]
    fn test_retry_bound_and_last_status() {
        let transport = ScriptedTransport::new()
            .respond(500, "a")
            .respond(502, "b")
            .respond(429, "c")
            .respond(504, "last");
        let runtime = FakeRuntime::new();

        let err = execute(&transport, &runtime, &policy(3, 10), &request()).unwrap_err();

        assert_eq!(transport.request_count(), 4);
        match err {
            Error::Api {
                status,
                body,
                attempts,
                ..
            } => {
                assert_eq!(status, 504);
                assert_eq!(body, "last");
                assert_eq!(attempts, 4);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_max_retries_is_capped() {
        let mut transport = ScriptedTransport::new();
        for _ in 0..10 {
            transport = transport.respond(503, "");
        }
        let runtime = FakeRuntime::new();

        let p = policy(50, 1);
        assert_eq!(p.max_retries(), MAX_RETRIES_CAP);
        let err = execute(&transport, &runtime, &p, &request()).unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(transport.request_count(), 6);
    }

    #[test]
    fn test_zero_retries_fails_fast() {
        let transport = ScriptedTransport::new().respond(503, "");
        let runtime = FakeRuntime::new();

        let err = execute(&transport, &runtime, &policy(0, 100), &request()).unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(transport.request_count(), 1);
        assert!(runtime.sleeps().is_empty());
    }

    #[test]
    fn test_no_retry_on_permanent_failure() {
        for status in [400u16, 401, 403, 404] {
            let mut transport = MockTransport::new();
            transport
                .expect_send()
                .times(1)
                .returning(move |_| Ok(RawResponse::from_bytes(status, "denied")));
            let runtime = FakeRuntime::new();

            let err = execute(&transport, &runtime, &policy(3, 100), &request()).unwrap_err();

            assert_eq!(err.status(), Some(status));
            assert!(runtime.sleeps().is_empty());
        }
    }

    #[test]
    fn test_retry_count_header() {
        let transport = ScriptedTransport::new()
            .respond(503, "")
            .respond(503, "")
            .respond(200, "{}");
        let runtime = FakeRuntime::new();

        execute(&transport, &runtime, &policy(3, 1), &request()).unwrap();

        let sent: Vec<Option<String>> = transport
            .requests()
            .iter()
            .map(|r| {
                r.headers
                    .get(RETRY_COUNT_HEADER)
                    .map(|v| v.to_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(
            sent,
            vec![None, Some("1".to_string()), Some("2".to_string())]
        );
    }

    #[test]
    fn test_total_delay_is_triangular() {
        let p = policy(5, 100);
        let mut slept = Duration::ZERO;
        for k in 1..=5u32 {
            slept += p.delay_before(k);
            assert_eq!(p.delay_before(k), Duration::from_millis(100 * u64::from(k)));
            assert_eq!(slept, p.total_delay(k));
        }
        assert_eq!(p.total_delay(5), Duration::from_millis(1500));
    }

    #[test]
    fn test_huge_base_sleep_saturates() {
        let p = RetryPolicy::new(5, Duration::from_millis(u64::MAX));
        assert_eq!(p.delay_before(3), Duration::MAX);
        assert_eq!(p.total_delay(5), Duration::MAX);
        assert_eq!(p.delay_before(1), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_transport_error_is_not_retried() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(Error::InvalidRequest("connection refused".to_string())));
        let runtime = FakeRuntime::new();

        let result = execute(&transport, &runtime, &policy(3, 100), &request());

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn test_default_policy() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_retries(), 3);
        assert_eq!(p.max_attempts(), 4);
        assert_eq!(p.base_sleep(), Duration::from_millis(500));
    }
}
