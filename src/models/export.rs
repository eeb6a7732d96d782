//! Bulk vulnerability and asset exports.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VulnsExportFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_family: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_found: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_found: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fixed: Option<i64>,
}

/// `POST vulns/export` body.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VulnsExportRequest {
    /// Assets per chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_assets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<VulnsExportFilters>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AssetsExportFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminated_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_scan_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_authenticated_scan_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_assessed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_plugin_results: Option<bool>,
}

/// `POST assets/export` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetsExportRequest {
    /// Assets per chunk.
    pub chunk_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<AssetsExportFilters>,
}

impl Default for AssetsExportRequest {
    fn default() -> Self {
        Self {
            chunk_size: 100,
            filters: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportUuid {
    pub export_uuid: String,
}

/// Lifecycle of a bulk export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportJobStatus {
    Queued,
    Processing,
    Finished,
    Error,
}

impl ExportJobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExportJobStatus::Finished | ExportJobStatus::Error)
    }
}

impl fmt::Display for ExportJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExportJobStatus::Queued => "QUEUED",
            ExportJobStatus::Processing => "PROCESSING",
            ExportJobStatus::Finished => "FINISHED",
            ExportJobStatus::Error => "ERROR",
        };
        f.write_str(text)
    }
}

/// `GET {vulns,assets}/export/{export_uuid}/status` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExportStatus {
    pub status: ExportJobStatus,
    /// Chunk ids ready for download, in the order the service reports them.
    #[serde(default)]
    pub chunks_available: Vec<u32>,
    #[serde(default)]
    pub chunks_failed: Vec<u32>,
    #[serde(default)]
    pub chunks_cancelled: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VulnAsset {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ipv4: Option<String>,
    #[serde(default)]
    pub fqdn: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VulnPlugin {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One vulnerability of a vulns export chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    #[serde(default)]
    pub asset: VulnAsset,
    #[serde(default)]
    pub plugin: VulnPlugin,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub first_found: Option<String>,
    #[serde(default)]
    pub last_found: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One asset of an assets export chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    #[serde(default)]
    pub has_agent: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub first_seen: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(default)]
    pub ipv4s: Vec<String>,
    #[serde(default)]
    pub fqdns: Vec<String>,
    #[serde(default)]
    pub hostnames: Vec<String>,
    #[serde(default)]
    pub operating_systems: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vulns_request_omits_unset_filters() {
        let request = VulnsExportRequest {
            num_assets: Some(50),
            filters: Some(VulnsExportFilters {
                severity: Some(vec!["high".to_string(), "critical".to_string()]),
                ..VulnsExportFilters::default()
            }),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "num_assets": 50,
                "filters": { "severity": ["high", "critical"] }
            })
        );
    }

    #[test]
    fn test_export_status_deserialize() {
        let status: ExportStatus = serde_json::from_str(
            r#"{"status": "FINISHED", "chunks_available": [3, 1, 2], "total_chunks": 3}"#,
        )
        .unwrap();
        assert_eq!(status.status, ExportJobStatus::Finished);
        assert_eq!(status.chunks_available, vec![3, 1, 2]);
        assert!(status.chunks_failed.is_empty());
        assert!(status.status.is_terminal());
    }

    #[test]
    fn test_vulnerability_record_keeps_unknown_fields() {
        let record: VulnerabilityRecord = serde_json::from_str(
            r#"{
                "asset": {"uuid": "a-1", "hostname": "web01", "network_id": "n"},
                "plugin": {"id": 19506, "name": "Nessus Scan Information"},
                "severity": "info",
                "state": "OPEN",
                "port": {"port": 0, "protocol": "TCP"}
            }"#,
        )
        .unwrap();

        assert_eq!(record.asset.hostname.as_deref(), Some("web01"));
        assert_eq!(record.asset.extra["network_id"], "n");
        assert_eq!(record.plugin.id, Some(19506));
        assert_eq!(record.extra["port"]["protocol"], "TCP");
    }

    #[test]
    fn test_asset_record_defaults() {
        let record: AssetRecord = serde_json::from_str(r#"{"id": "x", "sources": []}"#).unwrap();
        assert_eq!(record.id, "x");
        assert!(record.ipv4s.is_empty());
        assert!(record.extra.contains_key("sources"));
    }
}
