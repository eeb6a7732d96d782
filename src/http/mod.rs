//! HTTP layer: transport, status classification and the retrying executor.

mod client;
mod request;
mod retry;
mod status;
mod transport;

pub use client::{DEFAULT_CHUNK_SIZE, HttpClient};
pub use request::{ApiRequest, PreparedRequest};
pub use retry::{
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_SLEEP_MS, MAX_RETRIES_CAP, RETRY_COUNT_HEADER, RetryPolicy,
    execute,
};
pub use status::{Classification, ErrorCode, RETRYABLE_STATUSES, StatusClass, class_of, classify};
pub use transport::{API_KEYS_HEADER, IMPERSONATE_HEADER, RawResponse, ReqwestTransport, Transport};

#[cfg(test)]
pub(crate) use transport::MockTransport;
