//! Single-shot HTTP transport.

use std::fmt;
use std::io::{Cursor, Read};
use std::time::Duration;

use log::{LevelFilter, debug, trace};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;

use super::request::PreparedRequest;
use crate::error::{Error, Result};

/// Header carrying the API key pair.
pub const API_KEYS_HEADER: &str = "x-apikeys";

/// Header issuing calls on behalf of another user.
pub const IMPERSONATE_HEADER: &str = "x-impersonate";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Raw response: status, headers and an unread body.
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Box<dyn Read + Send>,
}

impl RawResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            headers,
            body: Box::new(body),
        }
    }

    /// Response with an in-memory body and no headers.
    pub fn from_bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, HeaderMap::new(), Cursor::new(body.into()))
    }

    /// Reads the whole body as (lossy) UTF-8.
    pub fn text(mut self) -> Result<String> {
        let mut bytes = Vec::new();
        self.body.read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads and deserializes the whole body.
    pub fn json<T: DeserializeOwned>(mut self) -> Result<T> {
        let mut bytes = Vec::new();
        self.body.read_to_end(&mut bytes)?;
        // 200 responses with an empty body still decode into unit-like types
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_str("null")?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Issues exactly one HTTP request. Retrying is the executor's job.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn send(&self, request: &PreparedRequest) -> Result<RawResponse>;
}

/// Transport backed by a blocking reqwest client.
///
/// The connection pool and the authentication headers are configured once
/// at construction and shared by every call. Request and response traces
/// are emitted only up to `log_threshold`, on top of the global logger filter.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    log_threshold: LevelFilter,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            log_threshold: LevelFilter::Trace,
        }
    }

    pub fn with_log_threshold(mut self, threshold: LevelFilter) -> Self {
        self.log_threshold = threshold;
        self
    }

    pub fn log_threshold(&self) -> LevelFilter {
        self.log_threshold
    }

    /// Builds a transport that authenticates every request with the key pair.
    pub fn with_credentials(
        access_key: &str,
        secret_key: &str,
        impersonate: Option<&str>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let mut keys = header_value(&format!(
            "accessKey={}; secretKey={};",
            access_key, secret_key
        ))?;
        keys.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEYS_HEADER), keys);

        if let Some(username) = impersonate {
            debug!("Impersonating {}", username);
            headers.insert(
                HeaderName::from_static(IMPERSONATE_HEADER),
                header_value(&format!("username={}", username))?,
            );
        }

        headers.insert(
            USER_AGENT,
            header_value(&format!("tenable-io-rust/{}", env!("CARGO_PKG_VERSION")))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(Self::new(client))
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }
}

impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, request), fields(signature = %request.signature()))]
    fn send(&self, request: &PreparedRequest) -> Result<RawResponse> {
        let traces = self.log_threshold >= LevelFilter::Debug;
        if traces {
            debug!("Request: {}", request.signature());
        }
        if self.log_threshold >= LevelFilter::Trace {
            if let Some(body) = &request.body {
                trace!("Request body: {}", body);
            }
        }

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        if traces {
            debug!("Response: {} -> {}", request.signature(), status);
        }

        let headers = response.headers().clone();
        Ok(RawResponse::new(status, headers, response))
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidRequest(format!("invalid header value: {}", e)))
}
