//! Client SDK for the Tenable.io vulnerability-management REST API.
//!
//! Every call goes through one retrying executor: 2xx responses are
//! returned, 429 and the common 5xx statuses are retried with a linearly
//! growing sleep, and everything else fails at once with [`Error::Api`].
//! Long-running server-side jobs (scans, exports, workbench reports) are
//! driven by the [`poll::Poller`] and exposed as blocking helpers.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod helpers;
pub mod http;
pub mod logging;
pub mod models;
pub mod poll;
pub mod runtime;

#[cfg(test)]
pub mod test_utils;

pub use client::{ClientBuilder, TenableIoClient};
pub use config::Config;
pub use error::{Error, Result};
pub use helpers::{FolderRef, PolicyRef, ScanRef};
pub use http::RetryPolicy;
pub use models::{ExportFormat, ScanStatus};
