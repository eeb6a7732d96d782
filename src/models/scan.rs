//! Scan resources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// Status of a scan (or of one of its runs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Initializing,
    Running,
    Paused,
    Pausing,
    Resuming,
    Stopping,
    Canceled,
    Completed,
    Aborted,
    Empty,
    Imported,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Statuses in which a scan is no longer doing work.
pub const STOPPED_STATUSES: [ScanStatus; 5] = [
    ScanStatus::Aborted,
    ScanStatus::Canceled,
    ScanStatus::Completed,
    ScanStatus::Imported,
    ScanStatus::Empty,
];

/// Statuses of a launched scan that has not started running yet.
pub const PENDING_STATUSES: [ScanStatus; 2] = [ScanStatus::Pending, ScanStatus::Initializing];

impl ScanStatus {
    pub fn is_stopped(self) -> bool {
        STOPPED_STATUSES.contains(&self)
    }

    pub fn is_pending(self) -> bool {
        PENDING_STATUSES.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Initializing => "initializing",
            ScanStatus::Running => "running",
            ScanStatus::Paused => "paused",
            ScanStatus::Pausing => "pausing",
            ScanStatus::Resuming => "resuming",
            ScanStatus::Stopping => "stopping",
            ScanStatus::Canceled => "canceled",
            ScanStatus::Completed => "completed",
            ScanStatus::Aborted => "aborted",
            ScanStatus::Empty => "empty",
            ScanStatus::Imported => "imported",
            ScanStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry of the scan list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub schedule_uuid: Option<String>,
    #[serde(default)]
    pub status: Option<ScanStatus>,
    #[serde(default)]
    pub folder_id: Option<u64>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// `GET scans` response. `scans` is `null` when there are none.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanList {
    #[serde(default)]
    pub scans: Option<Vec<Scan>>,
}

impl ScanList {
    pub fn into_scans(self) -> Vec<Scan> {
        self.scans.unwrap_or_default()
    }
}

/// The `info` block of scan details.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<ScanStatus>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub schedule_uuid: Option<String>,
    #[serde(default)]
    pub folder_id: Option<u64>,
    #[serde(default)]
    pub policy_id: Option<u64>,
    #[serde(default)]
    pub targets: Option<String>,
    #[serde(default)]
    pub scan_start: Option<i64>,
    #[serde(default)]
    pub scan_end: Option<i64>,
    #[serde(default)]
    pub object_id: Option<u64>,
}

impl ScanInfo {
    /// Settings payload for reconfiguring the scan.
    ///
    /// Carries the writable fields only, with `targets` renamed to
    /// `text_targets` as the settings endpoint expects.
    pub fn as_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        if let Some(name) = &self.name {
            payload.insert("name".to_string(), Value::from(name.clone()));
        }
        if let Some(folder_id) = self.folder_id {
            payload.insert("folder_id".to_string(), Value::from(folder_id));
        }
        if let Some(policy_id) = self.policy_id {
            payload.insert("policy_id".to_string(), Value::from(policy_id));
        }
        if let Some(targets) = &self.targets {
            payload.insert("text_targets".to_string(), Value::from(targets.clone()));
        }
        payload
    }
}

/// One run of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanHistory {
    pub history_id: u64,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub status: Option<ScanStatus>,
    #[serde(default)]
    pub creation_date: Option<i64>,
    #[serde(default)]
    pub last_modification_date: Option<i64>,
}

/// `GET scans/{scan_id}` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScanDetails {
    pub info: ScanInfo,
    #[serde(default)]
    pub history: Option<Vec<ScanHistory>>,
}

impl ScanDetails {
    pub fn histories(&self) -> &[ScanHistory] {
        self.history.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScanSettings {
    pub name: String,
    pub text_targets: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// `POST scans` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanCreateRequest {
    /// Template uuid.
    pub uuid: String,
    pub settings: ScanSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScanCreated {
    pub scan: Scan,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScanLaunchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_targets: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScanLaunched {
    pub scan_uuid: String,
}

/// Report formats for scan and workbench exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Nessus,
    Csv,
    Html,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Nessus => "nessus",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Html and pdf reports need at least one chapter.
    pub fn needs_chapters(self) -> bool {
        matches!(self, ExportFormat::Html | ExportFormat::Pdf)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nessus" => Ok(ExportFormat::Nessus),
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(Error::InvalidRequest(format!(
                "unsupported export format '{}'",
                other
            ))),
        }
    }
}

/// `POST scans/{scan_id}/export` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanExportRequest {
    pub format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<String>,
}

impl ScanExportRequest {
    /// Export request with the default chapter for html and pdf.
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            chapters: format.needs_chapters().then(|| "vuln_hosts_summary".to_string()),
        }
    }
}
