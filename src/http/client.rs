//! HTTP client with built-in retry logic and error handling.

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;
use url::Url;

use super::request::ApiRequest;
use super::retry::{RetryPolicy, execute};
use super::transport::{RawResponse, Transport};
use crate::error::{Error, Result};
use crate::runtime::Runtime;

/// Default size of the pieces a download is streamed in.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Endpoint-bound client: resolves requests, runs them through the retrying
/// executor and decodes the responses.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    runtime: Arc<dyn Runtime>,
    policy: RetryPolicy,
    base_url: Url,
    chunk_size: usize,
}

impl HttpClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        runtime: Arc<dyn Runtime>,
        base_url: Url,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            runtime,
            policy,
            base_url,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Sets the download chunk size. Zero is treated as one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.runtime
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Runs a request and returns the raw successful response.
    pub fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
        let prepared = request.prepare(&self.base_url)?;
        execute(
            self.transport.as_ref(),
            self.runtime.as_ref(),
            &self.policy,
            &prepared,
        )
    }

    /// Runs a request and deserializes the JSON response.
    #[tracing::instrument(skip(self, request), fields(template = request.template()))]
    pub fn json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        self.send(request)?.json()
    }

    /// Runs a request whose response body carries nothing of interest.
    #[tracing::instrument(skip(self, request), fields(template = request.template()))]
    pub fn send_empty(&self, request: &ApiRequest) -> Result<()> {
        let mut response = self.send(request)?;
        std::io::copy(&mut response.body, &mut std::io::sink())?;
        Ok(())
    }

    /// Streams the response body into `writer` in `chunk_size` pieces.
    /// Returns the number of bytes written.
    #[tracing::instrument(skip(self, request, writer), fields(template = request.template()))]
    pub fn download<W: Write + ?Sized>(&self, request: &ApiRequest, writer: &mut W) -> Result<u64> {
        let response = self.send(request)?;
        self.stream(response, writer)
    }

    /// Streams the response body into a file, creating parent directories.
    ///
    /// The file is only created once the service answered with success, so a
    /// failed request leaves nothing behind at `path`.
    #[tracing::instrument(skip(self, request), fields(template = request.template()))]
    pub fn download_to(&self, request: &ApiRequest, path: &Path) -> Result<u64> {
        let response = self.send(request)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !self.runtime.exists(parent) {
                self.runtime.create_dir_all(parent)?;
            }
        }
        let mut file = self.runtime.create_file(path)?;
        self.stream(response, &mut file)
    }

    fn stream<W: Write + ?Sized>(&self, mut response: RawResponse, writer: &mut W) -> Result<u64> {
        let mut buffer = vec![0u8; self.chunk_size];
        let mut downloaded_bytes: u64 = 0;

        loop {
            let read = match response.body.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            };
            writer.write_all(&buffer[..read])?;
            downloaded_bytes += read as u64;
        }
        writer.flush()?;

        debug!(
            "Downloaded {:.2} MB",
            downloaded_bytes as f64 / (1024.0 * 1024.0)
        );

        Ok(downloaded_bytes)
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("policy", &self.policy)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::transport::ReqwestTransport;
    use crate::test_utils::{FakeRuntime, ScriptedTransport};
    use std::time::Duration;
    use tempfile::tempdir;

    fn mockito_client(server: &mockito::Server, runtime: Arc<FakeRuntime>) -> HttpClient {
        let transport = ReqwestTransport::with_credentials("ak", "sk", None).unwrap();
        HttpClient::new(
            Arc::new(transport),
            runtime,
            Url::parse(&format!("{}/", server.url())).unwrap(),
            RetryPolicy::new(3, Duration::from_millis(10)),
        )
    }

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Folder {
        id: u64,
        name: String,
    }

    #[test]
    fn test_json_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/folders/3")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 3, "name": "My Scans"}"#)
            .create();

        let client = mockito_client(&server, Arc::new(FakeRuntime::new()));
        let folder: Folder = client
            .json(&ApiRequest::get("folders/{folder_id}").path("folder_id", 3))
            .unwrap();

        mock.assert();
        assert_eq!(
            folder,
            Folder {
                id: 3,
                name: "My Scans".to_string()
            }
        );
    }

    #[test]
    fn test_json_not_found_is_not_retried() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/folders/3")
            .with_status(404)
            .with_body(r#"{"error": "Folder not found"}"#)
            .expect(1)
            .create();

        let runtime = Arc::new(FakeRuntime::new());
        let client = mockito_client(&server, runtime.clone());
        let result: Result<Folder> =
            client.json(&ApiRequest::get("folders/{folder_id}").path("folder_id", 3));

        mock.assert();
        let err = result.unwrap_err();
        assert!(err.is_not_found());
        assert!(runtime.sleeps().is_empty());
    }

    #[test]
    fn test_server_error_is_retried_until_exhausted() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/scans")
            .with_status(502)
            .expect(4)
            .create();

        let runtime = Arc::new(FakeRuntime::new());
        let client = mockito_client(&server, runtime.clone());
        let err = client
            .json::<serde_json::Value>(&ApiRequest::get("scans"))
            .unwrap_err();

        mock.assert();
        assert_eq!(err.status(), Some(502));
        assert_eq!(
            runtime.sleeps(),
            vec![
                Duration::from_millis(10),
                Duration::from_millis(20),
                Duration::from_millis(30)
            ]
        );
    }

    #[test]
    fn test_download_streams_in_chunks() {
        let transport = Arc::new(ScriptedTransport::new().respond(200, "0123456789"));
        let client = HttpClient::new(
            transport,
            Arc::new(FakeRuntime::new()),
            Url::parse("https://cloud.example.com/").unwrap(),
            RetryPolicy::default(),
        )
        .with_chunk_size(3);

        let mut sink = Vec::new();
        let bytes = client
            .download(&ApiRequest::get("file"), &mut sink)
            .unwrap();

        assert_eq!(bytes, 10);
        assert_eq!(sink, b"0123456789");
    }

    #[test]
    fn test_download_to_creates_parent_directories() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/scans/4/export/77/download")
            .with_status(200)
            .with_body("<NessusClientData_v2/>")
            .create();

        let client = mockito_client(&server, Arc::new(FakeRuntime::new()));
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("scan.nessus");

        let bytes = client
            .download_to(
                &ApiRequest::get("scans/{scan_id}/export/{file_id}/download")
                    .path("scan_id", 4)
                    .path("file_id", 77),
                &path,
            )
            .unwrap();

        mock.assert();
        assert_eq!(bytes, 22);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "<NessusClientData_v2/>"
        );
    }

    #[test]
    fn test_download_to_failure_creates_no_file() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/scans/4/export/78/download")
            .with_status(404)
            .with_body(r#"{"error": "The requested file was not found"}"#)
            .expect(1)
            .create();

        let client = mockito_client(&server, Arc::new(FakeRuntime::new()));
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("scan.nessus");

        let err = client
            .download_to(
                &ApiRequest::get("scans/{scan_id}/export/{file_id}/download")
                    .path("scan_id", 4)
                    .path("file_id", 78),
                &path,
            )
            .unwrap_err();

        mock.assert();
        assert!(err.is_not_found());
        assert!(!path.exists());
        assert!(!dir.path().join("reports").exists());
    }

    #[test]
    fn test_send_empty_rejects_unbound_path() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = HttpClient::new(
            transport.clone(),
            Arc::new(FakeRuntime::new()),
            Url::parse("https://cloud.example.com/").unwrap(),
            RetryPolicy::default(),
        );

        let result = client.send_empty(&ApiRequest::post("scans/{scan_id}/stop"));

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
        assert_eq!(transport.request_count(), 0);
    }
}
