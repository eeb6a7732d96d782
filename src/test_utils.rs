//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::client::TenableIoClient;
use crate::error::Result;
use crate::http::{PreparedRequest, RawResponse, RetryPolicy, Transport};
use crate::runtime::Runtime;

/// Runtime with a virtual clock: `sleep` returns at once and advances `now`.
/// File operations hit the real file system.
pub struct FakeRuntime {
    start: Instant,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

impl Runtime for FakeRuntime {
    fn env_var(&self, _key: &str) -> std::result::Result<String, env::VarError> {
        Err(env::VarError::NotPresent)
    }

    fn config_dir(&self) -> Option<PathBuf> {
        None
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(std::fs::create_dir_all(path)?)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>> {
        Ok(Box::new(std::fs::File::create(path)?))
    }

    fn now(&self) -> Instant {
        self.start + self.total_slept()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Transport answering from a fixed script, in order, and recording every
/// request it receives. Panics when the script runs dry.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<(u16, String)>>,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back((status, body.into()));
        self
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `METHOD path` of every request, e.g. `POST /scans/1/launch`.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &PreparedRequest) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response left for {}", request.signature()));
        Ok(RawResponse::from_bytes(status, body))
    }
}

/// Client wired to a scripted transport and a virtual clock.
pub fn scripted_client(
    transport: ScriptedTransport,
) -> (TenableIoClient, Arc<ScriptedTransport>, Arc<FakeRuntime>) {
    let transport = Arc::new(transport);
    let runtime = Arc::new(FakeRuntime::new());
    let client = TenableIoClient::builder()
        .endpoint("https://cloud.example.com/")
        .retry_policy(RetryPolicy::new(3, Duration::from_millis(100)))
        .polling_interval(Duration::from_secs(10))
        .transport(transport.clone())
        .runtime(runtime.clone())
        .build()
        .unwrap();
    (client, transport, runtime)
}
