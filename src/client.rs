//! Top-level client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{LevelFilter, debug};
use url::Url;

use crate::api::{EditorApi, ExportsApi, FoldersApi, PoliciesApi, ScansApi, WorkbenchesApi};
use crate::config::{Config, DEFAULT_ENDPOINT};
use crate::error::{Error, Result};
use crate::helpers::{ExportsHelper, FolderHelper, PolicyHelper, ScanHelper, WorkbenchHelper};
use crate::http::{HttpClient, ReqwestTransport, RetryPolicy, Transport};
use crate::poll::{DEFAULT_POLLING_INTERVAL, Poller};
use crate::runtime::{RealRuntime, Runtime};

/// Vulnerability-management API client.
///
/// Cheap to clone; clones share one transport and connection pool.
///
/// # Example
///
/// ```no_run
/// use tenable_io::TenableIoClient;
///
/// # fn example() -> tenable_io::Result<()> {
/// let client = TenableIoClient::builder()
///     .access_key("access")
///     .secret_key("secret")
///     .build()?;
///
/// let scan = client.scan_helper().id(42);
/// scan.launch(true, None)?;
/// scan.wait_until_stopped(None)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TenableIoClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    poller: Poller,
    credentials: Option<(String, String)>,
    log_threshold: LevelFilter,
}

impl TenableIoClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Builds a client from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        ClientBuilder::from_config(config)?.build()
    }

    /// Builds a client from the environment and the default config file.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&Config::load(&RealRuntime)?)
    }

    pub fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    pub fn poller(&self) -> &Poller {
        &self.inner.poller
    }

    pub fn base_url(&self) -> &Url {
        self.inner.http.base_url()
    }

    /// A client issuing every call as `username`.
    ///
    /// Only available on clients built from an access/secret key pair.
    pub fn impersonate(&self, username: &str) -> Result<Self> {
        let (access_key, secret_key) = self.inner.credentials.as_ref().ok_or_else(|| {
            Error::InvalidRequest("impersonation needs a client built from API keys".to_string())
        })?;
        debug!("Creating client impersonating {}", username);

        let transport =
            ReqwestTransport::with_credentials(access_key, secret_key, Some(username))?
                .with_log_threshold(self.inner.log_threshold);
        let http = HttpClient::new(
            Arc::new(transport),
            self.inner.http.runtime().clone(),
            self.inner.http.base_url().clone(),
            *self.inner.http.retry_policy(),
        )
        .with_chunk_size(self.inner.http.chunk_size());

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                poller: self.inner.poller.clone(),
                credentials: self.inner.credentials.clone(),
                log_threshold: self.inner.log_threshold,
            }),
        })
    }

    // API accessors

    pub fn scans_api(&self) -> ScansApi {
        ScansApi::new(self.clone())
    }

    pub fn folders_api(&self) -> FoldersApi {
        FoldersApi::new(self.clone())
    }

    pub fn policies_api(&self) -> PoliciesApi {
        PoliciesApi::new(self.clone())
    }

    pub fn editor_api(&self) -> EditorApi {
        EditorApi::new(self.clone())
    }

    pub fn exports_api(&self) -> ExportsApi {
        ExportsApi::new(self.clone())
    }

    pub fn workbenches_api(&self) -> WorkbenchesApi {
        WorkbenchesApi::new(self.clone())
    }

    // Helpers

    pub fn scan_helper(&self) -> ScanHelper {
        ScanHelper::new(self.clone())
    }

    pub fn folder_helper(&self) -> FolderHelper {
        FolderHelper::new(self.clone())
    }

    pub fn policy_helper(&self) -> PolicyHelper {
        PolicyHelper::new(self.clone())
    }

    pub fn exports_helper(&self) -> ExportsHelper {
        ExportsHelper::new(self.clone())
    }

    pub fn workbench_helper(&self) -> WorkbenchHelper {
        WorkbenchHelper::new(self.clone())
    }
}

impl fmt::Debug for TenableIoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenableIoClient")
            .field("http", &self.inner.http)
            .field("poller", &self.inner.poller)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TenableIoClient`].
#[derive(Default)]
pub struct ClientBuilder {
    endpoint: Option<String>,
    access_key: Option<String>,
    secret_key: Option<String>,
    impersonate: Option<String>,
    retry_policy: Option<RetryPolicy>,
    polling_interval: Option<Duration>,
    chunk_size: Option<usize>,
    log_threshold: Option<LevelFilter>,
    transport: Option<Arc<dyn Transport>>,
    runtime: Option<Arc<dyn Runtime>>,
}

impl ClientBuilder {
    /// Pre-fills the builder from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (access_key, secret_key) = config.credentials()?;
        let mut builder = Self::default()
            .endpoint(config.endpoint.clone())
            .access_key(access_key)
            .secret_key(secret_key)
            .retry_policy(config.retry_policy())
            .polling_interval(config.poll_interval())
            .log_threshold(config.log_level()?);
        if let Some(username) = &config.impersonate {
            builder = builder.impersonate(username);
        }
        Ok(builder)
    }

    /// Base URL (default `https://cloud.tenable.com/`).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn access_key(mut self, key: impl Into<String>) -> Self {
        self.access_key = Some(key.into());
        self
    }

    pub fn secret_key(mut self, key: impl Into<String>) -> Self {
        self.secret_key = Some(key.into());
        self
    }

    pub fn impersonate(mut self, username: impl Into<String>) -> Self {
        self.impersonate = Some(username.into());
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = Some(interval);
        self
    }

    /// Download chunk size in bytes.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Upper bound for request/response traces of the built-in transport.
    pub fn log_threshold(mut self, threshold: LevelFilter) -> Self {
        self.log_threshold = Some(threshold);
        self
    }

    /// Replaces the HTTP transport. Credentials are then the transport's concern.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Result<TenableIoClient> {
        let base_url = parse_endpoint(self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT))?;

        let credentials = match (self.access_key, self.secret_key) {
            (Some(access), Some(secret)) => Some((access, secret)),
            _ => None,
        };

        let log_threshold = self.log_threshold.unwrap_or(LevelFilter::Trace);
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let (access, secret) = credentials.as_ref().ok_or_else(|| {
                    Error::Config("an access key and a secret key are required".to_string())
                })?;
                Arc::new(ReqwestTransport::with_credentials(
                    access,
                    secret,
                    self.impersonate.as_deref(),
                )?
                .with_log_threshold(log_threshold))
            }
        };

        let runtime: Arc<dyn Runtime> = self.runtime.unwrap_or_else(|| Arc::new(RealRuntime));
        let mut http = HttpClient::new(
            transport,
            runtime.clone(),
            base_url,
            self.retry_policy.unwrap_or_default(),
        );
        if let Some(chunk_size) = self.chunk_size {
            http = http.with_chunk_size(chunk_size);
        }
        let poller = Poller::new(
            runtime,
            self.polling_interval.unwrap_or(DEFAULT_POLLING_INTERVAL),
        );

        Ok(TenableIoClient {
            inner: Arc::new(ClientInner {
                http,
                poller,
                credentials,
                log_threshold,
            }),
        })
    }
}

/// Parses the endpoint, making sure relative paths join below it.
fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
